//! Write-to-temp-then-rename for small files (config, cosmic-bg settings).

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Context};

pub(crate) fn atomic_write(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let dir = path.parent().ok_or_else(|| anyhow!("invalid path {}", path.display()))?;
    fs::create_dir_all(dir).with_context(|| format!("create dir {}", dir.display()))?;

    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("chromadesk");
    let tmp = dir.join(format!(".{name}.tmp"));

    let write = || -> anyhow::Result<()> {
        let mut f = fs::File::create(&tmp).with_context(|| format!("create {}", tmp.display()))?;
        f.write_all(bytes).with_context(|| format!("write {}", tmp.display()))?;
        f.sync_all().with_context(|| format!("sync {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))
    };

    write().inspect_err(|_| {
        let _ = fs::remove_file(&tmp);
    })
}
