//! Capabilities the pipeline depends on. Infra provides the real adapters; tests use fakes.

use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;

use crate::error::{ApplyError, DownloadError, FetchError, StateError};
use crate::model::FeaturedImageInfo;
use crate::state::UpdateState;

/// Can fetch today's featured image metadata for a region. One network attempt per call.
pub trait MetadataFetcher {
    fn fetch(&self, region: &str) -> Result<FeaturedImageInfo, FetchError>;
}

/// Can stream the bytes behind a URL into a writer. Returns the byte count.
pub trait ImageTransport {
    fn download(&self, url: &str, out: &mut dyn Write) -> Result<u64, DownloadError>;
}

/// Can apply an image path as the desktop background.
pub trait BackgroundApplier {
    fn apply(&self, path: &Path) -> Result<(), ApplyError>;

    /// Best-effort user notification. Callers log and drop the error.
    fn notify(&self, title: &str, body: &str) -> anyhow::Result<()>;
}

pub trait UpdateStateStore {
    /// Never fails: a missing or broken store reads as defaults (disabled).
    fn read(&self) -> UpdateState;

    /// Update only the last-update date, leaving every other stored value intact.
    fn write_last_update_date(&self, date: NaiveDate) -> Result<(), StateError>;
}

pub trait Clock {
    /// Today's date on the local wall clock.
    fn today(&self) -> NaiveDate;
}

impl<T: MetadataFetcher + ?Sized> MetadataFetcher for &T {
    fn fetch(&self, region: &str) -> Result<FeaturedImageInfo, FetchError> {
        (**self).fetch(region)
    }
}

impl<T: ImageTransport + ?Sized> ImageTransport for &T {
    fn download(&self, url: &str, out: &mut dyn Write) -> Result<u64, DownloadError> {
        (**self).download(url, out)
    }
}

impl<T: BackgroundApplier + ?Sized> BackgroundApplier for &T {
    fn apply(&self, path: &Path) -> Result<(), ApplyError> {
        (**self).apply(path)
    }

    fn notify(&self, title: &str, body: &str) -> anyhow::Result<()> {
        (**self).notify(title, body)
    }
}

impl<T: UpdateStateStore + ?Sized> UpdateStateStore for &T {
    fn read(&self) -> UpdateState {
        (**self).read()
    }

    fn write_last_update_date(&self, date: NaiveDate) -> Result<(), StateError> {
        (**self).write_last_update_date(date)
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}
