//! Minimal TwiML rendering for the webhook reply. Twilio expects a `200 OK`
//! whose body is an XML response document with exactly one `<Message>`.

use axum::http::header;
use axum::response::{IntoResponse, Response};

pub struct TwimlMessage(pub String);

impl IntoResponse for TwimlMessage {
    fn into_response(self) -> Response {
        ([(header::CONTENT_TYPE, "text/xml")], document(&self.0)).into_response()
    }
}

pub fn document(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
        escape(body)
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_wraps_body_in_single_message() {
        let xml = document("Hola!");
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>Hola!</Message></Response>"
        );
    }

    #[test]
    fn reply_text_is_xml_escaped() {
        let xml = document("Send \"hola\" & pick 1 <now>");
        assert!(xml.contains("Send &quot;hola&quot; &amp; pick 1 &lt;now&gt;"));
        assert!(!xml.contains("<now>"));
    }
}
