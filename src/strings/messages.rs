//! # Messages
//!
//! Reply templates posted back to users. `{user}` is replaced with the author's handle.

pub const ANNOYED_REPLY: &str = "Ich höre ja schon auf, @{user} :(";
pub const AFFECTION_REPLY: &str = "Das ist wunderbar, @{user} :)";

/// Fills a reply template with the author's handle
pub fn render_reply(template: &str, user: &str) -> String {
    template.replace("{user}", user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_reply() {
        assert_eq!(
            render_reply(ANNOYED_REPLY, "alice"),
            "Ich höre ja schon auf, @alice :("
        );
        assert_eq!(render_reply("no placeholder", "alice"), "no placeholder");
    }
}
