use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::debug;

use crate::config::SmtpConfig;
use crate::error::{AppError, AppResult};
use crate::services::{EmailMessage, MailerService};

/// SMTP relay with STARTTLS on the configured port. Mails go out as
/// multipart/related HTML with the configured signature appended.
pub struct SmtpMailer {
    transport: Arc<SmtpTransport>,
    default_from_address: String,
    html_signature: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> AppResult<Self> {
        let transport = SmtpTransport::starttls_relay(&config.host)
            .map_err(|err| AppError::Mail(format!("cannot reach {}: {err}", config.host)))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();
        Ok(Self {
            transport: Arc::new(transport),
            default_from_address: config.default_from_address.clone(),
            html_signature: config.html_signature.clone(),
        })
    }

    fn wrap_body(&self, body_html: &str) -> String {
        format!(
            r##"<html>
  <head>
    <meta http-equiv="content-type" content="text/html; charset=iso-8859-15">
  </head>
  <body bgcolor="#FFFFFF" text="#000000">
    {body_html}
    <br>
    <div class="moz-signature">-- <br>
      {signature}
    </div>
  </body>
</html>"##,
            signature = self.html_signature
        )
    }

    fn build(&self, message: &EmailMessage) -> AppResult<Message> {
        let from = message
            .from
            .as_deref()
            .unwrap_or(&self.default_from_address);
        let mut builder = Message::builder()
            .from(parse_mailbox(from)?)
            .subject(&message.subject);
        if message.to.is_empty() {
            return Err(AppError::Mail("no recipients given".to_string()));
        }
        for to in &message.to {
            builder = builder.to(parse_mailbox(to)?);
        }
        for cc in &message.cc {
            builder = builder.cc(parse_mailbox(cc)?);
        }

        let mut related =
            MultiPart::related().singlepart(SinglePart::html(self.wrap_body(&message.body_html)));
        for image in &message.inline_images {
            let contents = std::fs::read(image)?;
            let content_id = file_stem(image)?;
            related = related.singlepart(
                Attachment::new_inline(content_id).body(contents, image_content_type(image)),
            );
        }

        let mut mixed = MultiPart::mixed().multipart(related);
        for attachment in &message.attachments {
            let contents = std::fs::read(attachment)?;
            let file_name = attachment
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| {
                    AppError::Mail(format!("invalid attachment path {}", attachment.display()))
                })?;
            mixed = mixed.singlepart(
                Attachment::new(file_name.to_string())
                    .body(contents, ContentType::parse("application/octet-stream").unwrap()),
            );
        }

        builder
            .multipart(mixed)
            .map_err(|err| AppError::Mail(format!("cannot compose mail: {err}")))
    }
}

#[async_trait]
impl MailerService for SmtpMailer {
    async fn send(&self, message: &EmailMessage) -> AppResult<()> {
        let mail = self.build(message)?;
        debug!(subject = %message.subject, recipients = message.to.len(), "sending mail");
        let transport = Arc::clone(&self.transport);
        tokio::task::spawn_blocking(move || transport.send(&mail))
            .await
            .map_err(|err| AppError::Mail(format!("mail task failed: {err}")))?
            .map_err(|err| AppError::Mail(format!("cannot send mail: {err}")))?;
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> AppResult<Mailbox> {
    address
        .trim()
        .parse()
        .map_err(|err| AppError::Mail(format!("invalid address '{address}': {err}")))
}

fn file_stem(path: &Path) -> AppResult<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| AppError::Mail(format!("invalid image path {}", path.display())))
}

fn image_content_type(path: &Path) -> ContentType {
    let mime = match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    };
    ContentType::parse(mime).unwrap()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn mailer() -> SmtpMailer {
        SmtpMailer::new(&SmtpConfig {
            host: "localhost".to_string(),
            port: 587,
            username: "me".to_string(),
            password: "secret".to_string(),
            default_from_address: "me@acme.test".to_string(),
            html_signature: "<b>Me</b>".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn wraps_body_with_signature() {
        let wrapped = mailer().wrap_body("<p>hello</p>");
        assert!(wrapped.contains("<p>hello</p>"));
        assert!(wrapped.contains(r##"<body bgcolor="#FFFFFF" text="#000000">"##));
        assert!(wrapped.contains(r#"<div class="moz-signature">-- <br>"#));
        assert!(wrapped.contains("<b>Me</b>"));
        assert!(wrapped.ends_with("</html>"));
    }

    #[test]
    fn builds_a_multipart_mail_with_attachment_and_inline_image() {
        let mut report = tempfile::Builder::new().suffix(".xls").tempfile().unwrap();
        report.write_all(b"workbook").unwrap();
        let mut image = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        image.write_all(b"jpeg").unwrap();

        let mail = mailer()
            .build(&EmailMessage {
                to: vec!["boss@acme.test".to_string()],
                cc: vec!["hr@acme.test".to_string()],
                from: None,
                subject: "Daily report".to_string(),
                body_html: "<p>Attached.</p>".to_string(),
                attachments: vec![report.path().to_path_buf()],
                inline_images: vec![image.path().to_path_buf()],
            })
            .unwrap();

        let rendered = String::from_utf8(mail.formatted()).unwrap();
        assert!(rendered.contains("Subject: Daily report"));
        assert!(rendered.contains("From: me@acme.test"));
        assert!(rendered.contains("multipart/mixed"));
        assert!(rendered.contains("multipart/related"));
        assert!(rendered.contains("Content-Disposition: attachment"));
    }

    #[test]
    fn refuses_a_mail_without_recipients() {
        let err = mailer()
            .build(&EmailMessage {
                subject: "x".to_string(),
                ..EmailMessage::default()
            })
            .err()
            .unwrap();
        assert!(err.to_string().contains("no recipients"));
    }
}
