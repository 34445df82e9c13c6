//! HTML rendering for the interactive login page

use cas_core::{escape, LoginForm};

/// Render the login form
///
/// The form posts back to `login` relative to the current page so it works
/// under any mount path. The service travels in a hidden field.
pub fn login_page(form: &LoginForm) -> String {
    let error = form
        .error
        .as_deref()
        .map(|e| format!("    <p class=\"error\">{}</p>\n", escape(e)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>Log in</title>
    <link rel="stylesheet" href="public/login.css">
  </head>
  <body>
    <h1>Log in</h1>
{error}    <form method="post" action="login">
      <input type="hidden" name="service" value="{service}">
      <label>Username <input type="text" name="username" value="{username}" autofocus></label>
      <label>Password <input type="password" name="password" value="{password}"></label>
      <button type="submit">Log in</button>
    </form>
  </body>
</html>
"#,
        service = escape(&form.service),
        username = escape(&form.username),
        password = escape(&form.password),
    )
}
