//! Google Calendar as a session source.
//!
//! Practice sessions are logged as events in a dedicated calendar (found by
//! name). Only timed events count: all-day events carry a `date` instead of
//! a `dateTime` and come through with missing endpoints, which the ledger
//! drops.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::SessionSource;
use crate::error::ImportError;
use crate::ledger::RawInterval;

/// Public Calendar API root.
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/calendar/v3/";

const MAX_RESULTS: &str = "2500";

/// One calendar of the user's calendar list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CalendarEntry {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventItem {
    #[serde(default)]
    start: Option<EventTime>,
    #[serde(default)]
    end: Option<EventTime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    #[serde(default)]
    date_time: Option<DateTime<FixedOffset>>,
}

impl EventItem {
    fn to_interval(&self) -> RawInterval {
        let instant = |t: &Option<EventTime>| {
            t.as_ref()
                .and_then(|t| t.date_time)
                .map(|dt| dt.with_timezone(&Utc))
        };
        RawInterval {
            start: instant(&self.start),
            end: instant(&self.end),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Pick the calendar named `name`: an exact case-insensitive match of the
/// trimmed summary first, then the first summary containing it.
pub fn find_calendar<'a>(calendars: &'a [CalendarEntry], name: &str) -> Option<&'a CalendarEntry> {
    let target = name.trim().to_lowercase();
    let summary = |c: &CalendarEntry| c.summary.as_deref().map(str::to_lowercase);
    calendars
        .iter()
        .find(|c| summary(c).is_some_and(|s| s.trim() == target))
        .or_else(|| {
            calendars
                .iter()
                .find(|c| summary(c).is_some_and(|s| s.contains(&target)))
        })
}

/// Reads timed events of one named calendar.
#[derive(Debug, Clone)]
pub struct GoogleCalendarSource {
    client: Client,
    base: Url,
    token: String,
    calendar_name: String,
}

impl GoogleCalendarSource {
    pub fn new(token: impl Into<String>, calendar_name: impl Into<String>) -> Result<Self, ImportError> {
        Self::with_base_url(token, calendar_name, DEFAULT_API_BASE)
    }

    /// Source talking to a different API root (a proxy or a test server).
    pub fn with_base_url(
        token: impl Into<String>,
        calendar_name: impl Into<String>,
        base: &str,
    ) -> Result<Self, ImportError> {
        let base = if base.ends_with('/') {
            Url::parse(base)?
        } else {
            Url::parse(&format!("{base}/"))?
        };
        Ok(Self {
            client: Client::new(),
            base,
            token: token.into(),
            calendar_name: calendar_name.into(),
        })
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T, ImportError> {
        let response = request.bearer_auth(&self.token).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(ImportError::NotAuthenticated {
                service: "google".into(),
            });
        }
        let message = match response.json::<ApiErrorBody>().await {
            Ok(body) => body.error.message,
            Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
        };
        Err(ImportError::Api(format!("{what}: {message}")))
    }

    /// Every calendar in the user's list, following pagination.
    pub async fn list_calendars(&self) -> Result<Vec<CalendarEntry>, ImportError> {
        let url = self.base.join("users/me/calendarList")?;
        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self.client.get(url.clone());
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }
            let page: Page<CalendarEntry> = self.send(request, "calendar list").await?;
            calendars.extend(page.items);
            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }
        Ok(calendars)
    }

    fn events_url(&self, calendar_id: &str) -> Result<Url, ImportError> {
        let mut url = self.base.join("calendars/")?;
        url.path_segments_mut()
            .map_err(|_| ImportError::Api(format!("cannot build events URL from {}", self.base)))?
            .pop_if_empty()
            .push(calendar_id)
            .push("events");
        Ok(url)
    }

    /// Timed intervals of `calendar_id` starting at or after `since`.
    pub async fn fetch_events(&self, calendar_id: &str, since: DateTime<Utc>) -> Result<Vec<RawInterval>, ImportError> {
        let url = self.events_url(calendar_id)?;
        let time_min = since.to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut intervals = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut query = vec![
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
                ("timeMin", time_min.as_str()),
                ("maxResults", MAX_RESULTS),
            ];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.as_str()));
            }
            let request = self.client.get(url.clone()).query(&query);
            let page: Page<EventItem> = self.send(request, "events fetch").await?;
            intervals.extend(page.items.iter().map(EventItem::to_interval));
            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }
        Ok(intervals)
    }
}

impl SessionSource for GoogleCalendarSource {
    fn name(&self) -> &str {
        "google"
    }

    async fn fetch(&self, since: DateTime<Utc>) -> Result<Vec<RawInterval>, ImportError> {
        let calendars = self.list_calendars().await?;
        let Some(calendar) = find_calendar(&calendars, &self.calendar_name) else {
            let found: Vec<&str> = calendars.iter().filter_map(|c| c.summary.as_deref()).collect();
            return Err(ImportError::CalendarNotFound {
                name: self.calendar_name.clone(),
                found: if found.is_empty() {
                    "(none)".into()
                } else {
                    found.join(", ")
                },
            });
        };
        debug!(calendar = %calendar.id, %since, "fetching calendar events");
        self.fetch_events(&calendar.id, since).await
    }
}
