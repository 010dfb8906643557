//! HTML pages for the login and registration forms.
//!
//! Simple inline HTML templates without a template engine.

const PAGE_STYLES: &str = r#"
    body {
        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
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
    h1 { color: #333; margin-top: 0; }
    label { display: block; font-weight: bold; margin: 12px 0 4px; }
    input { width: 100%; padding: 8px; box-sizing: border-box; }
    button { margin-top: 18px; padding: 10px 18px; background: #0066cc; color: white; border: 0; border-radius: 4px; }
    .error { background: #fdecea; color: #b71c1c; padding: 10px; border-radius: 4px; }
"#;

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn form_page(title: &str, action: &str, submit: &str, footer: &str, error: Option<&str>) -> String {
    let error_html = error
        .map(|e| format!(r#"<p class="error">{}</p>"#, escape_html(e)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title} - Parley</title>
    <style>{PAGE_STYLES}</style>
</head>
<body>
    <div class="container">
        <h1>{title}</h1>
        {error_html}
        <form method="post" action="{action}">
            <label for="username">Username</label>
            <input id="username" name="username" required autofocus>
            <label for="password">Password</label>
            <input id="password" name="password" type="password" required>
            <button type="submit">{submit}</button>
        </form>
        <p>{footer}</p>
    </div>
</body>
</html>"#
    )
}

pub fn login_page(error: Option<&str>) -> String {
    form_page(
        "Log in",
        "/login",
        "Log in",
        r#"No account? <a href="/register">Register</a>"#,
        error,
    )
}

pub fn register_page(error: Option<&str>) -> String {
    form_page(
        "Register",
        "/register",
        "Create account",
        r#"Already registered? <a href="/login">Log in</a>"#,
        error,
    )
}
