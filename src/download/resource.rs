//! Descriptors of the remote GeoNames artifacts.

use chrono::NaiveDate;
use url::Url;

use crate::error_handling::DownloadError;

/// How a remote resource is packaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Served as the text file itself
    Plain,
    /// Zip archive containing the text file
    Zip,
    /// Gzip-compressed text file
    Gzip,
}

/// A remote resource and the local file it yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub url: Url,
    /// Name of the extracted (or plain) file in the staging directory
    pub file_name: String,
    pub format: ArchiveFormat,
}

impl Resource {
    pub fn new(url: Url, file_name: impl Into<String>, format: ArchiveFormat) -> Self {
        Self {
            url,
            file_name: file_name.into(),
            format,
        }
    }

    /// Local name of the downloaded artifact: the last URL segment.
    pub fn archive_name(&self) -> String {
        self.url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.file_name.clone())
    }
}

/// Builds the GeoNames resources relative to a base URL.
#[derive(Debug, Clone)]
pub struct GeoNamesResources {
    base: Url,
}

impl GeoNamesResources {
    pub fn new(base_url: &str) -> Result<Self, DownloadError> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self {
            base: Url::parse(&base)?,
        })
    }

    fn resource(
        &self,
        remote: &str,
        file_name: &str,
        format: ArchiveFormat,
    ) -> Result<Resource, DownloadError> {
        Ok(Resource::new(self.base.join(remote)?, file_name, format))
    }

    /// Every feature of every country (`allCountries.zip`).
    pub fn all_countries(&self) -> Result<Resource, DownloadError> {
        self.resource("allCountries.zip", "allCountries.txt", ArchiveFormat::Zip)
    }

    /// Features of a single country (`IT.zip`).
    pub fn country_dump(&self, code: &str) -> Result<Resource, DownloadError> {
        let code = code.to_uppercase();
        self.resource(
            &format!("{}.zip", code),
            &format!("{}.txt", code),
            ArchiveFormat::Zip,
        )
    }

    /// Features outside any country, continents included (`no-country.zip`).
    pub fn no_country(&self) -> Result<Resource, DownloadError> {
        self.resource("no-country.zip", "no-country.txt", ArchiveFormat::Zip)
    }

    /// Descriptive country attributes (`countryInfo.txt`).
    pub fn country_info(&self) -> Result<Resource, DownloadError> {
        self.resource("countryInfo.txt", "countryInfo.txt", ArchiveFormat::Plain)
    }

    /// Rows modified on `date`.
    pub fn modifications(&self, date: NaiveDate) -> Result<Resource, DownloadError> {
        let name = format!("modifications-{}.txt", date.format("%Y-%m-%d"));
        self.resource(&name, &name, ArchiveFormat::Plain)
    }

    /// Geoname ids deleted on `date`.
    pub fn deletes(&self, date: NaiveDate) -> Result<Resource, DownloadError> {
        let name = format!("deletes-{}.txt", date.format("%Y-%m-%d"));
        self.resource(&name, &name, ArchiveFormat::Plain)
    }
}
