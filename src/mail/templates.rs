//! Bodies for the emails the service sends. HTML templates are escaped by
//! askama; the plain-text ones are not.

use askama::Template;

use crate::{
    domain::{Role, INVITE_VALIDITY_DAYS},
    error::Result,
};

use super::OutgoingMail;

pub struct InviteEmail<'a> {
    pub to: &'a str,
    pub full_name: &'a str,
    pub club_name: &'a str,
    pub role: Role,
    pub acceptance_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/invite.html")]
struct InviteHtml<'a> {
    email: &'a InviteEmail<'a>,
    valid_days: i64,
}

#[derive(Template)]
#[template(path = "email/invite.txt")]
struct InviteText<'a> {
    email: &'a InviteEmail<'a>,
    valid_days: i64,
}

impl InviteEmail<'_> {
    pub fn render(&self) -> Result<OutgoingMail> {
        let html_body = InviteHtml {
            email: self,
            valid_days: INVITE_VALIDITY_DAYS,
        }
        .render()?;
        let text_body = InviteText {
            email: self,
            valid_days: INVITE_VALIDITY_DAYS,
        }
        .render()?;

        Ok(OutgoingMail {
            to: self.to.to_string(),
            subject: format!("Invitation to join {}", self.club_name),
            html_body,
            text_body,
        })
    }
}

#[derive(Template)]
#[template(path = "email/password_reset.html")]
struct PasswordResetHtml<'a> {
    link: &'a str,
    valid_minutes: i64,
}

#[derive(Template)]
#[template(path = "email/password_reset.txt")]
struct PasswordResetText<'a> {
    link: &'a str,
    valid_minutes: i64,
}

pub fn password_reset_email(to: &str, reset_url: &str, valid_minutes: i64) -> Result<OutgoingMail> {
    Ok(OutgoingMail {
        to: to.to_string(),
        subject: "Reset your ClubGrid password".to_string(),
        html_body: PasswordResetHtml { link: reset_url, valid_minutes }.render()?,
        text_body: PasswordResetText { link: reset_url, valid_minutes }.render()?,
    })
}

#[derive(Template)]
#[template(path = "email/magic_link.html")]
struct MagicLinkHtml<'a> {
    link: &'a str,
    valid_minutes: i64,
}

#[derive(Template)]
#[template(path = "email/magic_link.txt")]
struct MagicLinkText<'a> {
    link: &'a str,
    valid_minutes: i64,
}

pub fn magic_link_email(to: &str, login_url: &str, valid_minutes: i64) -> Result<OutgoingMail> {
    Ok(OutgoingMail {
        to: to.to_string(),
        subject: "Your ClubGrid sign-in link".to_string(),
        html_body: MagicLinkHtml { link: login_url, valid_minutes }.render()?,
        text_body: MagicLinkText { link: login_url, valid_minutes }.render()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invite_email_mentions_everything_needed() {
        let mail = InviteEmail {
            to: "max@example.com",
            full_name: "Max Mustermann",
            club_name: "FC Example",
            role: Role::Coach,
            acceptance_url: "https://clubgrid.app/invite/abc",
        }
        .render()
        .unwrap();

        assert_eq!(mail.to, "max@example.com");
        assert_eq!(mail.subject, "Invitation to join FC Example");
        for body in [&mail.html_body, &mail.text_body] {
            assert!(body.contains("Max Mustermann"));
            assert!(body.contains("FC Example"));
            assert!(body.contains("Coach"));
            assert!(body.contains("https://clubgrid.app/invite/abc"));
            assert!(body.contains("7 days"));
        }
    }

    #[test]
    fn test_html_body_escapes_names() {
        let mail = InviteEmail {
            to: "x@example.com",
            full_name: "<script>",
            club_name: "A & B",
            role: Role::Player,
            acceptance_url: "https://clubgrid.app/invite/abc",
        }
        .render()
        .unwrap();

        assert!(!mail.html_body.contains("<script>"));
        assert!(mail.html_body.contains("&lt;script&gt;"));
        assert!(mail.html_body.contains("A &amp; B"));
        // Plain text goes out as typed.
        assert!(mail.text_body.contains("Hello <script>!"));
    }

    #[test]
    fn test_link_emails() {
        let reset = password_reset_email("a@example.com", "https://clubgrid.app/reset-password/t1", 60).unwrap();
        assert!(reset.text_body.contains("https://clubgrid.app/reset-password/t1"));
        assert!(reset.html_body.contains("60 minutes"));

        let login = magic_link_email("a@example.com", "https://clubgrid.app/login/t2", 15).unwrap();
        assert_eq!(login.subject, "Your ClubGrid sign-in link");
        assert!(login.text_body.contains("https://clubgrid.app/login/t2"));
        assert!(login.html_body.contains("15 minutes"));
    }
}
