//! Staff notification texts.
//!
//! Messages are rendered as Telegram HTML, so every user-supplied value is
//! escaped.

use super::contact::ContactMessage;
use super::order::Order;
use super::user::User;

/// Escape `&`, `<`, `>` and `"` for Telegram's HTML parse mode.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

/// Summary of a freshly placed order.
pub fn new_order_message(order: &Order, customer: &User) -> String {
    let mut text = format!(
        "<b>New order</b> #{}\nCustomer: {} ({})\nPhone: {}\nAddress: {}\n",
        order.id,
        escape_html(customer.name().as_ref()),
        escape_html(customer.email().as_ref()),
        escape_html(&order.delivery.phone),
        escape_html(&order.delivery.address),
    );
    for item in &order.items {
        text.push_str(&format!(
            "• {} × {} = {}\n",
            item.quantity.get(),
            escape_html(&item.name),
            item.line_total(),
        ));
    }
    text.push_str(&format!(
        "Total: <b>{}</b> ({}, {})\nETA: {} min",
        order.pricing.total,
        order.payment_method,
        order.payment_status,
        order.estimated_minutes.get(),
    ));
    if let Some(notes) = &order.delivery.notes {
        text.push_str(&format!("\nNotes: {}", escape_html(notes)));
    }
    text
}

/// Summary of a contact form submission.
pub fn contact_message(message: &ContactMessage) -> String {
    format!(
        "<b>New contact message</b>\nFrom: {} ({})\nSubject: {}\n\n{}",
        escape_html(message.name.as_ref()),
        escape_html(message.email.as_ref()),
        escape_html(&message.subject),
        escape_html(&message.message),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{Email, UserName};
    use chrono::Utc;
    use rstest::rstest;
    use uuid::Uuid;

    #[rstest]
    #[case("plain", "plain")]
    #[case("<b>&\"", "&lt;b&gt;&amp;&quot;")]
    fn escapes_markup(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(escape_html(raw), expected);
    }

    #[rstest]
    fn contact_text_escapes_user_input() {
        let message = ContactMessage {
            id: Uuid::new_v4(),
            name: UserName::new("<script>").expect("name"),
            email: Email::new("a@b.co").expect("email"),
            subject: String::from("Hi & bye"),
            message: String::from("1 < 2"),
            is_read: false,
            created_at: Utc::now(),
        };
        let text = contact_message(&message);
        assert!(text.contains("&lt;script&gt;"));
        assert!(text.contains("Hi &amp; bye"));
        assert!(text.contains("1 &lt; 2"));
        assert!(!text.contains("<script>"));
    }
}
