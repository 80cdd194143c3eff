use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::domain::record::{Record, Records};
use crate::error::{AppError, AppResult};
use crate::services::TimeClockService;

const PRODUCTION_SERVER: &str = "https://www.badgebox.com/server/version_rc4_0";
const RECORD_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// BadgeBox time-and-attendance API: form posts, a session token from
/// `user/login`, JSON replies that carry an `ERROR` member even on HTTP 200.
pub struct BadgeBoxClient {
    http: Client,
    server_url: String,
    username: String,
    password: String,
}

impl BadgeBoxClient {
    pub fn new(username: &str, password: &str) -> Self {
        Self::with_server(PRODUCTION_SERVER, username, password)
    }

    pub fn with_server(server_url: &str, username: &str, password: &str) -> Self {
        Self {
            http: Client::new(),
            server_url: server_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    async fn post(&self, path: &str, form: &[(&str, &str)]) -> AppResult<Value> {
        debug!(path, "badgebox api call");
        let response = self
            .http
            .post(format!("{}/{path}", self.server_url))
            .form(form)
            .send()
            .await
            .map_err(|err| AppError::TimeClock(format!("{path}: {err}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::TimeClock(format!(
                "{path}: BadgeBox responded with {status}: {body}"
            )));
        }
        let payload: Value = response
            .json()
            .await
            .map_err(|err| AppError::TimeClock(format!("{path}: failed to parse reply: {err}")))?;
        if let Some(error) = payload.get("ERROR") {
            return Err(AppError::TimeClock(format!("{path}: {error}")));
        }
        Ok(payload)
    }

    async fn login(&self) -> AppResult<String> {
        let payload = self
            .post(
                "user/login",
                &[
                    ("username", self.username.as_str()),
                    ("password", self.password.as_str()),
                ],
            )
            .await?;
        let login: LoginReply = serde_json::from_value(payload)
            .map_err(|err| AppError::TimeClock(format!("unexpected login reply: {err}")))?;
        Ok(login.user.session)
    }

    async fn last_record(&self, session: &str) -> AppResult<Option<Record>> {
        let payload = self
            .post("track/lastRecord", &[("session", session)])
            .await?;
        let reply: LastRecordReply = serde_json::from_value(payload)
            .map_err(|err| AppError::TimeClock(format!("unexpected last record reply: {err}")))?;
        reply
            .values
            .into_iter()
            .next()
            .map(|raw| raw.into_record())
            .transpose()
    }
}

#[async_trait]
impl TimeClockService for BadgeBoxClient {
    async fn records(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        include_last: bool,
    ) -> AppResult<Records> {
        let session = self.login().await?;
        let from_timestamp = format!("{} 00:00:00", from.format("%Y-%m-%d"));
        let to_timestamp = format!("{} 23:59:00", to.format("%Y-%m-%d"));
        let payload = self
            .post(
                "record/all",
                &[
                    ("session", session.as_str()),
                    ("from", from_timestamp.as_str()),
                    ("to", to_timestamp.as_str()),
                ],
            )
            .await?;
        let reply: RecordsReply = serde_json::from_value(payload)
            .map_err(|err| AppError::TimeClock(format!("unexpected records reply: {err}")))?;
        let mut records = Records::new(from, to);
        for raw in reply.records {
            records.add(raw.into_record()?);
        }
        if include_last
            && let Some(last) = self.last_record(&session).await?
        {
            records.add(last);
        }
        debug!(days = records.day_count(), entries = records.record_count(), "badgebox records");
        Ok(records)
    }
}

#[derive(Deserialize)]
struct LoginReply {
    user: LoginUser,
}

#[derive(Deserialize)]
struct LoginUser {
    session: String,
}

#[derive(Deserialize)]
struct RecordsReply {
    #[serde(default)]
    records: Vec<RawRecord>,
}

#[derive(Deserialize)]
struct LastRecordReply {
    #[serde(default)]
    values: Vec<RawRecord>,
}

#[derive(Deserialize)]
struct RawRecord {
    checkin: Option<String>,
    checkout: Option<String>,
    ckout_place: Option<String>,
}

impl RawRecord {
    fn into_record(self) -> AppResult<Record> {
        let check_in = self.checkin.as_deref().map(parse_timestamp).transpose()?;
        let check_out = self.checkout.as_deref().map(parse_timestamp).transpose()?;
        // An empty check-out place marks a clocking the server closed by
        // itself.
        let auto_check_out =
            check_out.is_some() && self.ckout_place.as_deref() == Some("");
        Ok(Record::new(check_in, check_out, auto_check_out))
    }
}

fn parse_timestamp(raw: &str) -> AppResult<NaiveDateTime> {
    if raw.is_empty() {
        return Err(AppError::TimeClock("empty clocking timestamp".to_string()));
    }
    NaiveDateTime::parse_from_str(raw, RECORD_TIMESTAMP_FORMAT)
        .map_err(|err| AppError::TimeClock(format!("cannot parse clocking '{raw}': {err}")))
}
