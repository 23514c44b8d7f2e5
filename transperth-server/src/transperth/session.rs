//! Session tokens scraped from the journey planner page.
//!
//! The JSON endpoint sits behind the site's CMS, which wants an
//! anti-forgery token and the page's module/tab ids echoed back as
//! headers. All three are embedded in the planner page.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

/// Module id used when the page does not reveal one.
pub const DEFAULT_MODULE_ID: &str = "5325";

/// Tab id used when the page does not reveal one.
pub const DEFAULT_TAB_ID: &str = "140";

static TOKEN_INPUT: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"input[name="__RequestVerificationToken"]"#).expect("valid selector")
});

static SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("valid selector"));

static MODULE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"ModuleId["']?\s*[:=]\s*["']?(\d+)"#).expect("valid regex")
});

static TAB_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"TabId["']?\s*[:=]\s*["']?(\d+)"#).expect("valid regex"));

/// Tokens sent as headers with every `PlanJourney` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokens {
    /// Anti-forgery token; requests without one may still succeed
    pub request_verification_token: Option<String>,
    pub module_id: String,
    pub tab_id: String,
}

impl Default for SessionTokens {
    fn default() -> Self {
        Self {
            request_verification_token: None,
            module_id: DEFAULT_MODULE_ID.to_string(),
            tab_id: DEFAULT_TAB_ID.to_string(),
        }
    }
}

/// Extract session tokens from the planner page HTML.
///
/// Missing ids fall back to the defaults; the last script mentioning an
/// id wins.
pub fn parse_session_page(html: &str) -> SessionTokens {
    let document = Html::parse_document(html);

    let request_verification_token = document
        .select(&TOKEN_INPUT)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(str::to_string);
    if request_verification_token.is_some() {
        debug!("found request verification token");
    }

    let mut module_id = None;
    let mut tab_id = None;
    for script in document.select(&SCRIPT) {
        let text: String = script.text().collect();
        if let Some(caps) = MODULE_ID.captures(&text) {
            module_id = Some(caps[1].to_string());
        }
        if let Some(caps) = TAB_ID.captures(&text) {
            tab_id = Some(caps[1].to_string());
        }
    }
    debug!(?module_id, ?tab_id, "scanned planner scripts");

    SessionTokens {
        request_verification_token,
        module_id: module_id.unwrap_or_else(|| DEFAULT_MODULE_ID.to_string()),
        tab_id: tab_id.unwrap_or_else(|| DEFAULT_TAB_ID.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_all_tokens() {
        let html = r#"
            <html><head>
            <script>var dnn = { "ModuleId": "6001", "TabId": 151 };</script>
            </head><body>
            <form><input type="hidden" name="__RequestVerificationToken" value="abc123"></form>
            </body></html>
        "#;

        let tokens = parse_session_page(html);
        assert_eq!(tokens.request_verification_token.as_deref(), Some("abc123"));
        assert_eq!(tokens.module_id, "6001");
        assert_eq!(tokens.tab_id, "151");
    }

    #[test]
    fn assignment_style_ids() {
        let html = "<script>ModuleId = 42; TabId='7';</script>";
        let tokens = parse_session_page(html);
        assert_eq!(tokens.module_id, "42");
        assert_eq!(tokens.tab_id, "7");
        assert_eq!(tokens.request_verification_token, None);
    }

    #[test]
    fn missing_everything_uses_defaults() {
        let tokens = parse_session_page("<html><body>maintenance</body></html>");
        assert_eq!(tokens, SessionTokens::default());
        assert_eq!(tokens.module_id, DEFAULT_MODULE_ID);
        assert_eq!(tokens.tab_id, DEFAULT_TAB_ID);
    }
}
