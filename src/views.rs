use crate::flash::Flash;

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn render_flashes(flashes: &[Flash]) -> String {
    if flashes.is_empty() {
        return String::new();
    }

    let items: String = flashes
        .iter()
        .map(|flash| {
            format!(
                r#"
        <li class="flash flash-{}">{}</li>"#,
                flash.level.as_str(),
                html_escape(&flash.message)
            )
        })
        .collect();
    format!(
        r#"<ul class="flashes">{}
    </ul>"#,
        items
    )
}

fn layout(title: &str, flashes: &[Flash], content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>{title} - WBAP</title>
</head>
<body>
    <nav>
        <a href="/register">Register</a>
        <a href="/login">Login</a>
        <a href="/home">Home</a>
    </nav>
    {flashes}
    <main>
{content}
    </main>
</body>
</html>
"#,
        title = html_escape(title),
        flashes = render_flashes(flashes),
        content = content,
    )
}

fn credentials_form(action: &str, submit: &str) -> String {
    format!(
        r#"        <form method="post" action="{action}">
            <label>Username <input type="text" name="username" required></label>
            <label>Password <input type="password" name="password" required></label>
            <button type="submit">{submit}</button>
        </form>"#,
        action = action,
        submit = submit,
    )
}

pub fn register_page(flashes: &[Flash]) -> String {
    let content = format!(
        "        <h1>Register</h1>\n{}\n        <p>Already registered? <a href=\"/login\">Log in</a>.</p>",
        credentials_form("/register", "Register")
    );
    layout("Register", flashes, &content)
}

pub fn login_page(flashes: &[Flash]) -> String {
    let content = format!(
        "        <h1>Login</h1>\n{}\n        <p>No account yet? <a href=\"/register\">Register</a>.</p>",
        credentials_form("/login", "Log in")
    );
    layout("Login", flashes, &content)
}

pub fn home_page(username: &str, flashes: &[Flash]) -> String {
    let content = format!(
        "        <h1>Welcome, {}!</h1>\n        <p><a href=\"/logout\">Log out</a></p>",
        html_escape(username)
    );
    layout("Home", flashes, &content)
}
