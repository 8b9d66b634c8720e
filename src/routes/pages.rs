// HTML pages: the options form and the shared message/error page

use crate::error::ReportError;

const HOME_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Tidepool glucose report</title>
  <link rel="stylesheet" href="/static/style.css">
</head>
<body>
  <h1>Tidepool glucose report</h1>
  <form method="post" action="/opts">
    <label>Email <input type="email" name="useremail" required></label>
    <label>Password <input type="password" name="password" required></label>
    <label>Start date <input type="date" name="startdate"></label>
    <label>End date <input type="date" name="enddate"></label>
    <label>Data type
      <select name="datatype">
        <option value="smbg" selected>Self-monitored blood glucose (smbg)</option>
      </select>
    </label>
    <button type="submit">Create PDF</button>
  </form>
</body>
</html>
"#;

pub fn home_page() -> String {
    HOME_PAGE.to_string()
}

/// General purpose message page; every field is escaped.
pub fn message_page(title: &str, lines: &[String]) -> String {
    let mut body = String::new();
    for line in lines {
        body.push_str("    <p>");
        body.push_str(&escape_html(line));
        body.push_str("</p>\n");
    }
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <link rel="stylesheet" href="/static/style.css">
</head>
<body>
  <h1>{title}</h1>
  <div class="message">
{body}  </div>
  <p><a href="/">Back</a></p>
</body>
</html>
"#,
        title = escape_html(title),
        body = body
    )
}

pub fn error_page(err: &ReportError) -> String {
    let lines = match err {
        ReportError::InvalidInput(msg) => vec![msg.clone()],
        ReportError::Auth { status_text, .. } => vec![
            format!("Status: {}", status_text),
            "Check your Tidepool email and password.".into(),
        ],
        ReportError::Fetch { status_text, .. } => vec![format!("Status: {}", status_text)],
        ReportError::Transport(e) => vec![e.to_string()],
        ReportError::MalformedPayload(_) => vec![
            "Tidepool answered with data this service does not understand.".into(),
            "This is not caused by the form input; please try again later.".into(),
        ],
        ReportError::ServiceReported(se) => vec![
            format!("Status: {}", se.status),
            format!("Id: {}", se.id),
            format!("Code: {}", se.code),
            format!("Message: {}", se.message),
        ],
        ReportError::Render(msg) => vec![msg.clone()],
    };
    message_page(err.title(), &lines)
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
