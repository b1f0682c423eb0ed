#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;
use tzk_targets::{Clock, DeviceBridge};
use tzk_util::ToolFailure;

/// Clock whose sleeps return at once and only move its own time forward.
pub struct ManualClock {
    now: Mutex<Instant>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    /// Moves time forward without recording a sleep, as a slow check would.
    pub fn advance(&self, duration: Duration) {
        *self.now.lock().unwrap() += duration;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        *self.now.lock().unwrap() += duration;
    }
}

/// Bridge replaying canned `devices` responses. The last response repeats.
pub struct FakeBridge {
    listings: Mutex<VecDeque<Result<String, ToolFailure>>>,
    connect_response: Result<String, String>,
    pub device_calls: Mutex<u32>,
    pub connects: Mutex<Vec<String>>,
}

impl FakeBridge {
    pub fn new(listings: Vec<Result<String, ToolFailure>>) -> Self {
        Self {
            listings: Mutex::new(listings.into()),
            connect_response: Ok(String::new()),
            device_calls: Mutex::new(0),
            connects: Mutex::new(Vec::new()),
        }
    }

    pub fn listing(rows: &[(&str, &str, &str)]) -> String {
        let mut out = String::from("List of devices attached\n");
        for (name, kind, id) in rows {
            out.push_str(&format!("{name}\t{kind}\t{id}\n"));
        }
        out
    }

    pub fn with_connect_response(mut self, response: Result<String, String>) -> Self {
        self.connect_response = response;
        self
    }

    pub fn device_calls(&self) -> u32 {
        *self.device_calls.lock().unwrap()
    }
}

impl DeviceBridge for FakeBridge {
    async fn connect(&self, address: &str) -> Result<String, ToolFailure> {
        self.connects.lock().unwrap().push(address.to_string());
        self.connect_response
            .clone()
            .map_err(|stderr| ToolFailure::exit("sdb", 1, "", &stderr))
    }

    async fn devices(&self) -> Result<String, ToolFailure> {
        *self.device_calls.lock().unwrap() += 1;
        let mut listings = self.listings.lock().unwrap();
        if listings.len() > 1 {
            return listings.pop_front().unwrap_or_else(|| Ok(String::new()));
        }
        match listings.front() {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(_)) => Err(ToolFailure::exit("sdb", 1, "", "error: daemon not running")),
            None => Ok(String::new()),
        }
    }
}
