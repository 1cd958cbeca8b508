//! HTML templates for the login flow
//!
//! Inline HTML without a template engine. The list views themselves are
//! served as JSON.

/// Styles for the login page
const LOGIN_STYLES: &str = r#"
    body {
        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Arial, sans-serif;
        max-width: 420px;
        margin: 80px auto;
        padding: 0 20px;
        background: #f5f5f5;
    }
    .container {
        background: white;
        padding: 30px;
        border-radius: 8px;
        box-shadow: 0 2px 4px rgba(0,0,0,0.1);
    }
    h1 {
        color: #333;
        border-bottom: 2px solid #2e7d32;
        padding-bottom: 10px;
    }
    .form-group {
        margin: 15px 0;
    }
    label {
        display: block;
        font-weight: bold;
        margin-bottom: 5px;
    }
    input[type="text"],
    input[type="password"] {
        width: 100%;
        padding: 10px;
        border: 1px solid #ddd;
        border-radius: 4px;
        box-sizing: border-box;
    }
    button {
        background: #2e7d32;
        color: white;
        padding: 10px 20px;
        border: none;
        border-radius: 4px;
        cursor: pointer;
    }
    .error {
        background: #fdecea;
        color: #b71c1c;
        padding: 10px;
        border-radius: 4px;
    }
"#;

/// Render the login page
///
/// `next` is carried through the form so a successful login can return to
/// the page that required it.
pub fn login_page(error: Option<&str>, next: Option<&str>) -> String {
    let error_html = error.map_or(String::new(), |e| {
        format!(r#"<div class="error">{}</div>"#, html_escape(e))
    });
    let next_html = next.map_or(String::new(), |n| {
        format!(
            r#"<input type="hidden" name="next" value="{}">"#,
            html_escape(n)
        )
    });

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>SideQuests - Login</title>
    <style>{LOGIN_STYLES}</style>
</head>
<body>
    <div class="container">
        <h1>SideQuests</h1>
        {error_html}
        <form method="POST" action="/login">
            {next_html}
            <div class="form-group">
                <label for="username">Username:</label>
                <input type="text" id="username" name="username" required autofocus>
            </div>
            <div class="form-group">
                <label for="password">Password:</label>
                <input type="password" id="password" name="password" required>
            </div>
            <button type="submit">Login</button>
        </form>
    </div>
</body>
</html>"#
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_page_without_error() {
        let html = login_page(None, None);
        assert!(html.contains(r#"action="/login""#));
        assert!(!html.contains(r#"class="error""#));
        assert!(!html.contains(r#"name="next""#));
    }

    #[test]
    fn test_login_page_escapes_error_and_next() {
        let html = login_page(Some("<bad>"), Some(r#"/list/1"><script>"#));
        assert!(html.contains("&lt;bad&gt;"));
        assert!(html.contains("/list/1&quot;&gt;&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
