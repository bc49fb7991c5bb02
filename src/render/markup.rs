use tracing::warn;

use crate::types::{Notice, Severity};

pub const STYLE_CLASS: &str = "notify-styles";
pub const CONTAINER_CLASS: &str = "notify-container";
pub const NOTICE_CLASS: &str = "notify-notice";
pub const SHOW_CLASS: &str = "show";
pub const HIDE_CLASS: &str = "hide";

pub const STYLESHEET: &str = r"
.notify-container {
    position: fixed;
    top: 20px;
    right: 20px;
    z-index: 2147483647;
    display: flex;
    flex-direction: column;
    gap: 8px;
    pointer-events: none;
}
.notify-notice {
    min-width: 280px;
    max-width: 320px;
    padding: 12px 16px;
    border-radius: 8px;
    font-size: 14px;
    display: flex;
    align-items: flex-start;
    opacity: 0;
    transform: translateX(120%) scale(0.95);
    transition: all 0.5s cubic-bezier(0.22, 1, 0.36, 1);
    box-shadow: 0 4px 12px rgba(0,0,0,0.15);
    color: white;
    pointer-events: auto;
}
.notify-notice.show { opacity: 1; transform: translateX(0) scale(1); }
.notify-notice.hide {
    opacity: 0;
    transform: translateX(100%) scale(0.98);
    transition: all 0.45s cubic-bezier(0.32, 0, 0.67, 0);
}
.notify-icon { margin-right: 12px; font-size: 16px; margin-top: 2px; flex-shrink: 0; }
.notify-message { flex: 1; padding-right: 12px; line-height: 1.5; overflow-wrap: break-word; }
.notify-close {
    background: transparent;
    border: none;
    color: rgba(255,255,255,0.8);
    cursor: pointer;
    border-radius: 50%;
    width: 20px;
    height: 20px;
}
.notify-close:hover { color: white; background: rgba(255,255,255,0.1); }
.notify-notice.success { background: #34C759; }
.notify-notice.error { background: #FF3B30; }
.notify-notice.warning { background: #FF9500; }
.notify-notice.info { background: #007AFF; }
";

const CLOSE_BUTTON: &str = r#"<button class="notify-close" aria-label="Close notification" type="button"><i class="fas fa-times" aria-hidden="true"></i></button>"#;

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Escapes a message for display. Raw HTML is never let through: asking for
/// it only logs a warning and skips the line-break conversion.
pub fn format_message(message: &str, allow_html: bool) -> String {
    if allow_html {
        warn!("HTML content in notifications is disabled; message will be escaped");
        return escape_html(message);
    }
    escape_html(message).replace('\n', "<br>")
}

pub const fn icon_class(severity: Severity) -> &'static str {
    match severity {
        Severity::Success => "fa-solid fa-circle-check",
        Severity::Error => "fa-solid fa-circle-xmark",
        Severity::Warning => "fa-solid fa-triangle-exclamation",
        Severity::Info => "fa-solid fa-circle-info",
    }
}

pub fn notice_markup(notice: &Notice, allow_html: bool) -> String {
    format!(
        r#"<i class="notify-icon {icon}" aria-hidden="true"></i><div class="notify-message">{message}</div>{close}"#,
        icon = icon_class(notice.severity),
        message = format_message(&notice.message, allow_html),
        close = if notice.closable { CLOSE_BUTTON } else { "" },
    )
}
