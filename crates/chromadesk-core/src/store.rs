//! On-disk wallpaper store: deterministic filenames, download-once, retention.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{DownloadError, StoreError};
use crate::model::FeaturedImageInfo;
use crate::ports::ImageTransport;

const KNOWN_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "bmp"];
const DEFAULT_EXTENSION: &str = "jpg";

/// Result of [`ImageStore::materialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub path: PathBuf,
    /// The file was already present and no download happened.
    pub reused: bool,
}

pub struct ImageStore<T> {
    dir: PathBuf,
    transport: T,
}

impl<T> ImageStore<T> {
    pub fn new(dir: impl Into<PathBuf>, transport: T) -> Self {
        Self {
            dir: dir.into(),
            transport,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn ensure_directory(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::new("create dir", &self.dir, e))
    }

    pub fn path_for(&self, info: &FeaturedImageInfo) -> PathBuf {
        self.dir.join(filename_for(info.date, &info.full_url))
    }
}

impl<T: ImageTransport> ImageStore<T> {
    /// Return the local file for `info`, downloading it only when it is not stored yet.
    ///
    /// Bytes land in a hidden `.part` file that is renamed onto the final name once complete,
    /// so an interrupted download never shows up under the final name.
    pub fn materialize(&self, info: &FeaturedImageInfo) -> Result<StoredImage, DownloadError> {
        self.store_url(&filename_for(info.date, &info.full_url), &info.full_url)
    }

    /// Same as [`ImageStore::materialize`] for an arbitrary image URL picked by the user.
    pub fn materialize_url(&self, url: &str, date: NaiveDate) -> Result<StoredImage, DownloadError> {
        self.store_url(&custom_filename_for(date, url), url)
    }

    fn store_url(&self, name: &str, url: &str) -> Result<StoredImage, DownloadError> {
        let target = self.dir.join(name);

        if target.is_file() {
            info!(path = %target.display(), "Image already stored, reusing");
            // Retention orders by mtime; a reused image must count as the newest.
            if let Err(e) = mark_used(&target) {
                warn!(path = %target.display(), error = %e, "Failed to refresh image mtime");
            }
            return Ok(StoredImage {
                path: target,
                reused: true,
            });
        }

        let tmp = self.dir.join(format!(".{name}.part"));
        info!(url, path = %target.display(), "Downloading image");
        match self.download_atomic(url, &tmp, &target) {
            Ok(bytes) => {
                info!(bytes, path = %target.display(), "Download complete");
                Ok(StoredImage {
                    path: target,
                    reused: false,
                })
            }
            Err(err) => {
                if let Err(e) = fs::remove_file(&tmp) {
                    if e.kind() != io::ErrorKind::NotFound {
                        warn!(path = %tmp.display(), error = %e, "Failed to remove partial download");
                    }
                }
                Err(err)
            }
        }
    }

    fn download_atomic(&self, url: &str, tmp: &Path, target: &Path) -> Result<u64, DownloadError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: io::Error| DownloadError::Io { path, source }
        };

        let mut file = File::create(tmp).map_err(io_err(tmp))?;
        let bytes = self.transport.download(url, &mut file)?;
        if bytes == 0 {
            return Err(DownloadError::Empty);
        }
        file.sync_all().map_err(io_err(tmp))?;
        drop(file);

        fs::rename(tmp, target).map_err(io_err(target))?;
        Ok(bytes)
    }
}

impl<T> ImageStore<T> {
    /// Delete stored images beyond the `keep` most recently modified ones.
    ///
    /// `keep <= 0` deletes nothing. A file that cannot be removed is logged and skipped.
    /// Returns how many files were removed.
    pub fn prune(&self, keep: i64) -> Result<usize, StoreError> {
        if keep <= 0 {
            debug!(keep, "Retention disabled, nothing pruned");
            return Ok(0);
        }
        let keep = usize::try_from(keep).unwrap_or(usize::MAX);

        let images = self.list_images()?;
        let mut removed = 0;
        for path in images.into_iter().skip(keep) {
            match fs::remove_file(&path) {
                Ok(()) => {
                    info!(path = %path.display(), "Removed old wallpaper");
                    removed += 1;
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove old wallpaper"),
            }
        }
        Ok(removed)
    }

    /// Stored images, newest first. `limit <= 0` returns all of them.
    pub fn history(&self, limit: i64) -> Result<Vec<PathBuf>, StoreError> {
        let mut images = self.list_images()?;
        if limit > 0 {
            images.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        Ok(images)
    }

    fn list_images(&self) -> Result<Vec<PathBuf>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::new("read dir", &self.dir, e)),
        };

        let mut files: Vec<(SystemTime, PathBuf)> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::new("read dir", &self.dir, e))?;
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            let meta = match entry.metadata() {
                Ok(m) if m.is_file() => m,
                Ok(_) => continue,
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            let stamp = meta
                .modified()
                .or_else(|_| meta.created())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            files.push((stamp, entry.path()));
        }

        files.sort_by(|a, b| b.cmp(a));
        Ok(files.into_iter().map(|(_, p)| p).collect())
    }
}

/// Deterministic filename for an image: `bing_<YYYYMMDD>_<url hash>.<ext>`.
pub fn filename_for(date: NaiveDate, url: &str) -> String {
    hashed_name("bing", date, url)
}

/// Filename for a user-supplied URL: `custom_<YYYYMMDD>_<url hash>.<ext>`.
pub fn custom_filename_for(date: NaiveDate, url: &str) -> String {
    hashed_name("custom", date, url)
}

fn hashed_name(prefix: &str, date: NaiveDate, url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let hash: String = digest.iter().take(8).map(|b| format!("{b:02x}")).collect();
    format!("{prefix}_{}_{hash}.{}", date.format("%Y%m%d"), extension_for(url))
}

fn mark_used(path: &Path) -> io::Result<()> {
    File::options()
        .write(true)
        .open(path)?
        .set_modified(SystemTime::now())
}

fn extension_for(url: &str) -> &'static str {
    let Ok(parsed) = Url::parse(url) else {
        return known_extension(url).unwrap_or(DEFAULT_EXTENSION);
    };

    // Bing serves images from `/th?id=OHR.Name_1920x1080.jpg`.
    let from_path = parsed
        .path_segments()
        .and_then(|mut s| s.next_back())
        .and_then(known_extension);
    let from_id = || {
        parsed
            .query_pairs()
            .find(|(k, _)| k == "id")
            .and_then(|(_, v)| known_extension(&v))
    };

    from_path.or_else(from_id).unwrap_or(DEFAULT_EXTENSION)
}

fn known_extension(name: &str) -> Option<&'static str> {
    let (_, ext) = name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    KNOWN_EXTENSIONS.into_iter().find(|k| *k == ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::Write;
    use std::time::Duration;

    struct FakeTransport {
        body: &'static [u8],
        fail_after: Option<usize>,
        calls: Cell<usize>,
    }

    impl FakeTransport {
        fn ok(body: &'static [u8]) -> Self {
            Self {
                body,
                fail_after: None,
                calls: Cell::new(0),
            }
        }

        fn failing_after(body: &'static [u8], n: usize) -> Self {
            Self {
                body,
                fail_after: Some(n),
                calls: Cell::new(0),
            }
        }
    }

    impl ImageTransport for FakeTransport {
        fn download(&self, _url: &str, out: &mut dyn Write) -> Result<u64, DownloadError> {
            self.calls.set(self.calls.get() + 1);
            if let Some(n) = self.fail_after {
                out.write_all(&self.body[..n]).unwrap();
                return Err(DownloadError::Transport("connection reset".into()));
            }
            out.write_all(self.body).unwrap();
            Ok(self.body.len() as u64)
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn info(url: &str) -> FeaturedImageInfo {
        FeaturedImageInfo {
            date: day(2024, 1, 1),
            title: Some("T".into()),
            copyright: None,
            full_url: url.into(),
        }
    }

    fn touch(path: &Path, age_secs: u64) {
        let f = File::create(path).unwrap();
        f.set_modified(SystemTime::now() - Duration::from_secs(age_secs))
            .unwrap();
    }

    #[test]
    fn filename_is_stable_and_distinct() {
        let a = filename_for(day(2024, 1, 1), "https://x/img.jpg");
        assert_eq!(a, filename_for(day(2024, 1, 1), "https://x/img.jpg"));
        assert!(a.starts_with("bing_20240101_"));
        assert!(a.ends_with(".jpg"));

        assert_ne!(a, filename_for(day(2024, 1, 2), "https://x/img.jpg"));
        assert_ne!(a, filename_for(day(2024, 1, 1), "https://x/other.jpg"));
    }

    #[test]
    fn filename_extension_from_bing_id_query() {
        let url = "https://www.bing.com/th?id=OHR.Lake_EN-US123_1920x1080.png&rid=hp&pid=hp";
        assert!(filename_for(day(2024, 1, 1), url).ends_with(".png"));

        let url = "https://www.bing.com/th?id=OHR.Lake";
        assert!(filename_for(day(2024, 1, 1), url).ends_with(".jpg"));
    }

    #[test]
    fn materialize_downloads_then_reuses() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path(), FakeTransport::ok(b"jpeg-bytes"));

        let first = store.materialize(&info("https://x/img.jpg")).unwrap();
        assert!(!first.reused);
        assert_eq!(std::fs::read(&first.path).unwrap(), b"jpeg-bytes");

        let second = store.materialize(&info("https://x/img.jpg")).unwrap();
        assert!(second.reused);
        assert_eq!(second.path, first.path);
        assert_eq!(store.transport.calls.get(), 1);
    }

    #[test]
    fn materialize_reuses_existing_file_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path(), FakeTransport::ok(b"new"));
        let i = info("https://x/img.jpg");
        std::fs::write(store.path_for(&i), b"old").unwrap();

        let got = store.materialize(&i).unwrap();
        assert!(got.reused);
        assert_eq!(std::fs::read(&got.path).unwrap(), b"old");
        assert_eq!(store.transport.calls.get(), 0);
    }

    #[test]
    fn reused_image_becomes_newest_for_retention() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path(), FakeTransport::ok(b"new"));
        let i = info("https://x/img.jpg");
        touch(&store.path_for(&i), 2 * 86_400);
        touch(&dir.path().join("fetched_later.jpg"), 60);

        let got = store.materialize(&i).unwrap();
        assert!(got.reused);
        assert_eq!(store.history(0).unwrap()[0], got.path);

        assert_eq!(store.prune(1).unwrap(), 1);
        assert!(got.path.is_file());
    }

    #[test]
    fn custom_url_gets_its_own_name() {
        let url = "https://example.org/pics/sunset.PNG";
        let name = custom_filename_for(day(2026, 10, 19), url);
        assert!(name.starts_with("custom_20261019_"), "{name}");
        assert!(name.ends_with(".png"), "{name}");
        assert_eq!(
            name.trim_start_matches("custom"),
            filename_for(day(2026, 10, 19), url).trim_start_matches("bing")
        );

        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path(), FakeTransport::ok(b"png-bytes"));
        let got = store.materialize_url(url, day(2026, 10, 19)).unwrap();
        assert_eq!(got.path, dir.path().join(&name));
        assert!(!got.reused);
        assert!(store.materialize_url(url, day(2026, 10, 19)).unwrap().reused);
        assert_eq!(store.transport.calls.get(), 1);
    }

    #[test]
    fn failed_download_leaves_no_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path(), FakeTransport::failing_after(b"partial-bytes", 4));
        let i = info("https://x/img.jpg");

        let err = store.materialize(&i).unwrap_err();
        assert!(matches!(err, DownloadError::Transport(_)));
        assert!(!store.path_for(&i).exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn empty_body_is_a_download_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path(), FakeTransport::ok(b""));
        let i = info("https://x/img.jpg");

        assert!(matches!(store.materialize(&i), Err(DownloadError::Empty)));
        assert!(!store.path_for(&i).exists());
    }

    #[test]
    fn prune_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        for (name, age) in [("a.jpg", 500), ("b.jpg", 400), ("c.jpg", 300), ("d.jpg", 200), ("e.jpg", 100)] {
            touch(&dir.path().join(name), age);
        }
        let store = ImageStore::new(dir.path(), FakeTransport::ok(b""));

        assert_eq!(store.prune(2).unwrap(), 3);

        let left = store.history(0).unwrap();
        let names: Vec<_> = left
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["e.jpg", "d.jpg"]);
    }

    #[test]
    fn prune_with_non_positive_keep_deletes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.jpg"), 10);
        touch(&dir.path().join("b.jpg"), 20);
        let store = ImageStore::new(dir.path(), FakeTransport::ok(b""));

        assert_eq!(store.prune(0).unwrap(), 0);
        assert_eq!(store.prune(-3).unwrap(), 0);
        assert_eq!(store.history(0).unwrap().len(), 2);
    }

    #[test]
    fn prune_ignores_hidden_files_and_dirs() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.jpg"), 30);
        touch(&dir.path().join("b.jpg"), 20);
        touch(&dir.path().join(".c.jpg.part"), 1000);
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let store = ImageStore::new(dir.path(), FakeTransport::ok(b""));

        assert_eq!(store.prune(1).unwrap(), 1);
        assert!(dir.path().join("b.jpg").exists());
        assert!(!dir.path().join("a.jpg").exists());
        assert!(dir.path().join(".c.jpg.part").exists());
        assert!(dir.path().join("sub").is_dir());
    }

    #[test]
    fn history_of_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path().join("nope"), FakeTransport::ok(b""));
        assert!(store.history(7).unwrap().is_empty());
        assert_eq!(store.prune(1).unwrap(), 0);
    }

    #[test]
    fn ensure_directory_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path().join("a/b/c"), FakeTransport::ok(b""));
        store.ensure_directory().unwrap();
        store.ensure_directory().unwrap();
        assert!(store.dir().is_dir());
    }
}
