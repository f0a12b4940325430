use crate::models::MatchedRecord;

/// One message, rendered for every channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub subject: String,
    /// Full HTML body for email.
    pub html: String,
    /// Telegram HTML-subset text.
    pub chat: String,
}

impl Alert {
    /// Sent once when the bot comes up.
    pub fn startup() -> Self {
        let subject = "Pumping Alt bot started".to_string();
        let html = "<p>The signal bot is now running.<br>\
             You will be alerted about assets with a \
             <strong style='color: #1E90FF;'>negative funding rate</strong> \
             and a price change of more than \
             <strong style='color: #1E90FF;'>5% in 24 hours</strong>.</p>"
            .to_string();
        let chat = format!("<b>{subject}</b>\nThe signal bot is now running.");

        Self {
            subject,
            html,
            chat,
        }
    }

    /// Alert for an asset that newly meets both conditions.
    pub fn for_record(record: &MatchedRecord) -> Self {
        let name = escape(&record.name);
        let id = escape(&record.id);
        let link = escape(&record.link);
        let subject = format!("New signal: {} ({})", record.name, record.id);

        let html = format!(
            "<p>A new asset meets both conditions:</p>\
             <p>Name: <a href='{link}' target='_blank' style='text-decoration: none;'>{name}</a></p>\
             <p>ID: <a href='{link}' target='_blank' style='text-decoration: none;'>{id}</a></p>\
             <p>Funding Rate: <span style='color: red;'>{}%</span></p>\
             <p>24h price change: <span style='color: green;'>{}%</span></p>",
            record.funding_rate, record.pchange_24h
        );

        let chat = format!(
            "<b>{}</b>\n\
             Name: <a href='{link}'>{name}</a>\n\
             ID: <a href='{link}'>{id}</a>\n\
             Funding Rate: <b>{}%</b>\n\
             24h price change: <b>{}%</b>",
            escape(&subject),
            record.funding_rate,
            record.pchange_24h
        );

        Self {
            subject,
            html,
            chat,
        }
    }
}

/// Escapes the characters Telegram's HTML mode and mail clients care about.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
