//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::source::source::SourceError;
use curl::easy::Easy;
use std::time::Duration;

const USER_AGENT: &str = concat!("treecrown/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP client with optional basic authentication
#[derive(Clone, Debug, Default)]
pub struct HttpClient {
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Option<Duration>,
}

impl HttpClient {
    pub fn new() -> HttpClient {
        HttpClient::default()
    }
    pub fn with_auth(username: Option<String>, password: Option<String>) -> HttpClient {
        HttpClient {
            username,
            password,
            timeout: Some(Duration::from_secs(60)),
        }
    }
    /// GET request returning the response body
    pub fn get(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        debug!("GET {}", url);
        let mut easy = Easy::new();
        easy.url(url)?;
        easy.useragent(USER_AGENT)?;
        easy.follow_location(true)?;
        if let Some(timeout) = self.timeout {
            easy.timeout(timeout)?;
        }
        if let Some(ref username) = self.username {
            easy.username(username)?;
            easy.password(self.password.as_deref().unwrap_or(""))?;
        }
        let mut data = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|chunk| {
                data.extend_from_slice(chunk);
                Ok(chunk.len())
            })?;
            transfer.perform()?;
        }
        let code = easy.response_code()?;
        if code >= 400 {
            return Err(SourceError::Http {
                url: url.to_string(),
                code,
            });
        }
        Ok(data)
    }
}
