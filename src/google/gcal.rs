//! Google Calendar v3 client

use async_trait::async_trait;
use chrono::{DateTime, Days, FixedOffset, NaiveDate, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::oauth::refresh_access_token;
use crate::accounts::Credential;
use crate::reminders::{CalendarError, CalendarEvent, CalendarProvider, ReminderEvent};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventDateTime {
    pub fn display(&self) -> Option<String> {
        match (&self.date_time, &self.date) {
            (Some(dt), _) => Some(dt.to_rfc3339()),
            (None, Some(d)) => Some(d.to_string()),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReminderOverride {
    pub method: String,
    pub minutes: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventReminders {
    pub use_default: bool,
    pub overrides: Vec<ReminderOverride>,
}

/// Request body of `events.insert`
#[derive(Debug, Serialize)]
pub struct EventBody {
    pub summary: String,
    pub description: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub recurrence: Vec<String>,
    pub reminders: EventReminders,
}

impl From<&ReminderEvent> for EventBody {
    fn from(event: &ReminderEvent) -> Self {
        let time_zone = Some(event.time_zone.name().to_string());
        // All-day end dates are exclusive
        let end_date = event
            .date
            .checked_add_days(Days::new(1))
            .unwrap_or(event.date);
        Self {
            summary: event.summary.clone(),
            description: event.description.clone(),
            start: EventDateTime {
                date: Some(event.date),
                date_time: None,
                time_zone: time_zone.clone(),
            },
            end: EventDateTime {
                date: Some(end_date),
                date_time: None,
                time_zone,
            },
            recurrence: event.recurrence(),
            reminders: EventReminders {
                use_default: false,
                overrides: event
                    .offsets
                    .iter()
                    .map(|o| ReminderOverride {
                        method: o.method.to_string(),
                        minutes: o.minutes,
                    })
                    .collect(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEvent {
    pub id: String,
    pub summary: Option<String>,
    #[serde(default)]
    pub start: EventDateTime,
    #[serde(default)]
    pub end: EventDateTime,
    pub html_link: Option<String>,
}

impl From<GoogleEvent> for CalendarEvent {
    fn from(event: GoogleEvent) -> Self {
        CalendarEvent {
            start: event.start.display(),
            end: event.end.display(),
            id: event.id,
            summary: event.summary,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventList {
    #[serde(default)]
    items: Vec<GoogleEvent>,
    next_page_token: Option<String>,
}

/// Calendar client for one user. Refreshes the access token when it is
/// about to expire; check `rotated_credential()` after use and persist
/// it.
pub struct GoogleCalendar {
    client: Client,
    api_hostname: String,
    loaded_token: String,
    credential: Mutex<Credential>,
}

impl GoogleCalendar {
    pub fn new(api_hostname: &str, credential: Credential) -> Self {
        Self {
            client: Client::new(),
            api_hostname: api_hostname.trim_end_matches('/').to_string(),
            loaded_token: credential.access_token.clone(),
            credential: Mutex::new(credential),
        }
    }

    /// The current credential if it was refreshed since the client was
    /// created.
    pub async fn rotated_credential(&self) -> Option<Credential> {
        let credential = self.credential.lock().await;
        if credential.access_token == self.loaded_token {
            None
        } else {
            Some(credential.clone())
        }
    }

    async fn access_token(&self) -> Result<String, CalendarError> {
        let mut credential = self.credential.lock().await;
        if credential.is_expired(Utc::now().timestamp()) {
            *credential = refresh_access_token(&credential).await?;
        }
        Ok(credential.access_token.clone())
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendar/v3/calendars/{}/events",
            self.api_hostname,
            urlencoding::encode(calendar_id)
        )
    }

    /// Refresh after the provider rejected `rejected`. Returns `None`
    /// when there is no refresh token to try.
    async fn force_refresh(&self, rejected: &str) -> Result<Option<String>, CalendarError> {
        let mut credential = self.credential.lock().await;
        if credential.refresh_token.is_none() {
            return Ok(None);
        }
        // Another call may have refreshed already
        if credential.access_token == rejected {
            *credential = refresh_access_token(&credential).await?;
        }
        Ok(Some(credential.access_token.clone()))
    }

    /// Send with the current token. A 401 gets one refresh and one retry.
    async fn send(&self, request: RequestBuilder) -> Result<Response, CalendarError> {
        let token = self.access_token().await?;
        let retry = request.try_clone();
        let res = request.bearer_auth(&token).send().await?;
        if res.status() != StatusCode::UNAUTHORIZED {
            return Ok(res);
        }
        let Some(retry) = retry else {
            return Ok(res);
        };
        let Some(refreshed) = self.force_refresh(&token).await? else {
            return Ok(res);
        };
        tracing::debug!("Access token rejected, retrying with a refreshed one");
        let res = retry.bearer_auth(refreshed).send().await?;
        Ok(res)
    }

    /// Upcoming single events between `time_min` and `time_max`, soonest
    /// first.
    pub async fn upcoming_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        max_results: usize,
    ) -> Result<Vec<GoogleEvent>, CalendarError> {
        let request = self.client.get(self.events_url(calendar_id)).query(&[
            ("timeMin", time_min.to_rfc3339()),
            ("timeMax", time_max.to_rfc3339()),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
            ("maxResults", max_results.to_string()),
        ]);
        let list: EventList = parse(self.send(request).await?).await?;
        Ok(list.items)
    }
}

async fn check(res: Response) -> Result<Response, CalendarError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let text = res.text().await.unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED {
        return Err(CalendarError::StaleOrMissingCredential(format!(
            "{} ({})",
            status, text
        )));
    }
    Err(CalendarError::ProviderUnavailable(format!("{} ({})", status, text)))
}

async fn parse<T: for<'de> Deserialize<'de>>(res: Response) -> Result<T, CalendarError> {
    let text = check(res).await?.text().await?;
    serde_json::from_str(&text)
        .map_err(|e| CalendarError::ProviderUnavailable(format!("unexpected response: {}", e)))
}

#[async_trait]
impl CalendarProvider for GoogleCalendar {
    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &ReminderEvent,
    ) -> Result<CalendarEvent, CalendarError> {
        let body = EventBody::from(event);
        let request = self.client.post(self.events_url(calendar_id)).json(&body);
        let created: GoogleEvent = parse(self.send(request).await?).await?;
        if let Some(link) = &created.html_link {
            tracing::debug!("Event created: {}", link);
        }
        Ok(created.into())
    }

    async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<FixedOffset>,
        time_max: DateTime<FixedOffset>,
        query: &str,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![
                ("timeMin", time_min.to_rfc3339()),
                ("timeMax", time_max.to_rfc3339()),
                ("q", query.to_string()),
            ];
            if let Some(token) = &page_token {
                params.push(("pageToken", token.clone()));
            }
            let request = self.client.get(self.events_url(calendar_id)).query(&params);
            let list: EventList = parse(self.send(request).await?).await?;
            events.extend(list.items.into_iter().map(CalendarEvent::from));

            match list.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(events)
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), CalendarError> {
        let url = format!(
            "{}/{}",
            self.events_url(calendar_id),
            urlencoding::encode(event_id)
        );
        let res = self.send(self.client.delete(url)).await?;
        // Already gone
        if matches!(res.status(), StatusCode::NOT_FOUND | StatusCode::GONE) {
            tracing::debug!("Event {} was already deleted", event_id);
            return Ok(());
        }
        check(res).await?;
        Ok(())
    }
}
