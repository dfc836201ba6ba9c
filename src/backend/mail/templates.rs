//! Verification mail content

use crate::shared::{AppConfig, LicensedRoute};

/// Rendered mail ready to send
#[derive(Debug, Clone, PartialEq)]
pub struct MailContent {
    pub subject: String,
    pub html: String,
    pub text: String,
}

struct RouteTexts {
    subject: &'static str,
    header: &'static str,
    main: &'static str,
    footer: &'static str,
}

fn texts(route: LicensedRoute) -> RouteTexts {
    match route {
        LicensedRoute::ResetPassword => RouteTexts {
            subject: "Reset your password",
            header: "Hello {name}!",
            main: "We received a request to reset the password of your account. \
                   Enter the code below to continue. If you did not ask for this, \
                   you can ignore this mail.",
            footer: "Stay safe",
        },
        LicensedRoute::TerminateAccount => RouteTexts {
            subject: "Confirm account termination",
            header: "Goodbye {name}?",
            main: "We received a request to delete your account and all of its data. \
                   Enter the code below to confirm. This cannot be undone.",
            footer: "We are sorry to see you go",
        },
        LicensedRoute::TwoFactorAuth => RouteTexts {
            subject: "Your login code",
            header: "Welcome back {name}!",
            main: "Someone is signing in to your account. Enter the code below to \
                   finish logging in. If it was not you, change your password.",
            footer: "See you inside",
        },
        LicensedRoute::MigrateEmail => RouteTexts {
            subject: "Change your email address",
            header: "Hello {name}!",
            main: "We received a request to move your account to a new email address. \
                   Enter the code below to continue.",
            footer: "Best regards",
        },
    }
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Mail carrying `otp` for the `route` flow, greeting `name`
pub fn verify_mail(route: LicensedRoute, name: &str, otp: &str, config: &AppConfig) -> MailContent {
    let texts = texts(route);
    let app = escape(&config.name);
    let header = texts.header.replace("{name}", &escape(name));

    let html = format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>Verification Email</title>
  </head>
  <body style="margin: 0; padding: 0; background-color: #eeeeee; font-family: Arial, sans-serif">
    <table role="presentation" cellpadding="0" cellspacing="0" width="100%" style="background-color: #eeeeee">
      <tr>
        <td align="center" style="padding: 20px 10px">
          <table role="presentation" cellpadding="0" cellspacing="0" width="100%"
                 style="max-width: 600px; background-color: #18181b; color: #eeeeee; border-radius: 4px">
            <tr>
              <td align="center" style="padding: 30px 40px 10px 40px">
                <img src="{cdn}/branding/banner.png" alt="{app} Logo" height="15" style="display: block; margin: 0 auto" />
              </td>
            </tr>
            <tr>
              <td style="padding: 0 40px"><hr style="border: 0; border-top: 1px solid #eeeeee; margin: 20px 0" /></td>
            </tr>
            <tr>
              <td style="padding: 0 40px 20px 40px; color: #eeeeee">
                <h1 style="margin: 0 0 20px 0; font-size: 24px; font-weight: bold">{header}</h1>
                <p style="margin: 0 0 20px 0; font-size: 16px; line-height: 1.5; text-align: justify">{main}</p>
                <div style="font-size: 32px; font-weight: bold; text-align: center; margin: 15px 0">{otp}</div>
                <p style="margin: 0; font-size: 16px">{footer}, <br /><strong>{app}</strong></p>
              </td>
            </tr>
          </table>
        </td>
      </tr>
    </table>
  </body>
</html>
"#,
        cdn = config.urls.cdn,
        main = texts.main,
        otp = escape(otp),
        footer = texts.footer,
    );

    let text = format!(
        "{}\n\n{}\n\n{}\n\n{},\n{}\n",
        texts.header.replace("{name}", name),
        texts.main,
        otp,
        texts.footer,
        config.name
    );

    MailContent {
        subject: texts.subject.to_string(),
        html,
        text,
    }
}
