//! Handlers for the list commands: list, search, new, merge, export, fetch.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use dlist_core::catalog::{ListCache, UNTITLED};
use dlist_core::{DownloadEntry, DownloadList, HttpClient};
use tracing::{debug, info};

use crate::app::context::RunContext;
use crate::cli::{ExportArgs, FetchArgs, ListArgs, MergeArgs, NewArgs, SearchArgs};

pub(crate) fn is_remote(source: &str) -> bool {
    let lower = source.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Loads a list from a path, or from a URL through the cache.
pub(crate) async fn load_list(source: &str, ctx: &RunContext) -> Result<DownloadList> {
    if is_remote(source) {
        let client = HttpClient::with_timeouts(ctx.connect_timeout_secs, ctx.read_timeout_secs)
            .context("Failed to build HTTP client")?;
        let fetched = ListCache::new(&ctx.cache_dir)
            .fetch(&client, source)
            .await
            .with_context(|| format!("Failed to open list from '{source}'"))?;
        debug!(path = %fetched.path.display(), from_cache = fetched.from_cache, "list resolved");
        return Ok(fetched.list);
    }
    DownloadList::load(Path::new(source))
        .with_context(|| format!("Failed to open list '{source}'"))
}

/// `index  title  size  date  stars`, blank columns for missing values.
pub(crate) fn format_entry_row(index: usize, entry: &DownloadEntry) -> String {
    let stars = entry.stars();
    let mut row = format!("{index:>5}  {}", entry.display_title());
    for column in [
        entry.file_size.as_deref(),
        entry.upload_date.as_deref(),
        Some(stars.as_str()).filter(|stars| !stars.is_empty()),
    ]
    .into_iter()
    .flatten()
    {
        row.push_str("  ");
        row.push_str(column);
    }
    row
}

pub(crate) async fn run_list_command(args: &ListArgs, ctx: &RunContext) -> Result<()> {
    let list = load_list(&args.list, ctx).await?;
    let per_page = args
        .page_size
        .and_then(|size| usize::try_from(size).ok())
        .unwrap_or(ctx.page_size);
    let page = list.page(args.page, per_page);

    println!(
        "{} - page {}/{} ({} entries)",
        list.display_name(),
        page.number,
        page.total_pages,
        list.len()
    );
    for (index, entry) in &page.entries {
        println!("{}", format_entry_row(*index, entry));
    }
    Ok(())
}

pub(crate) async fn run_search_command(args: &SearchArgs, ctx: &RunContext) -> Result<()> {
    let list = load_list(&args.list, ctx).await?;
    let hits = list.search(&args.term);
    info!(term = %args.term, matches = hits.len(), "search complete");
    for (index, entry) in hits {
        println!("{}", format_entry_row(index, entry));
    }
    Ok(())
}

pub(crate) fn run_new_command(args: &NewArgs) -> Result<()> {
    let name = if args.name.trim().is_empty() {
        UNTITLED
    } else {
        args.name.trim()
    };
    DownloadList::new(name)
        .save(&args.output)
        .with_context(|| format!("Failed to create list '{}'", args.output.display()))?;
    println!("Created {}", args.output.display());
    Ok(())
}

pub(crate) fn run_merge_command(args: &MergeArgs) -> Result<()> {
    let lists = args
        .inputs
        .iter()
        .map(|path| {
            DownloadList::load(path)
                .with_context(|| format!("Failed to open list '{}'", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;
    let merged = DownloadList::merge(&lists)?;
    merged
        .save(&args.output)
        .with_context(|| format!("Failed to write merged list '{}'", args.output.display()))?;
    println!(
        "Merged {} lists into {} ({} entries)",
        lists.len(),
        args.output.display(),
        merged.len()
    );
    Ok(())
}

pub(crate) async fn run_export_command(args: &ExportArgs, ctx: &RunContext) -> Result<()> {
    let list = load_list(&args.list, ctx).await?;
    list.without_ratings()
        .save(&args.output)
        .with_context(|| format!("Failed to export list to '{}'", args.output.display()))?;
    println!("Exported {} without ratings", args.output.display());
    Ok(())
}

pub(crate) async fn run_fetch_command(args: &FetchArgs, ctx: &RunContext) -> Result<PathBuf> {
    let client = HttpClient::with_timeouts(ctx.connect_timeout_secs, ctx.read_timeout_secs)
        .context("Failed to build HTTP client")?;
    let mut cache = ListCache::new(&ctx.cache_dir);
    if args.refresh {
        cache = cache.with_max_age(Duration::ZERO);
    }
    let fetched = cache
        .fetch(&client, &args.url)
        .await
        .with_context(|| format!("Failed to fetch list from '{}'", args.url))?;
    println!(
        "{} ({} entries){} -> {}",
        fetched.list.display_name(),
        fetched.list.len(),
        if fetched.from_cache { " [cached]" } else { "" },
        fetched.path.display()
    );
    Ok(fetched.path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::cli::TransferArgs;

    fn ctx(dir: &Path) -> RunContext {
        let mut ctx = RunContext::resolve(None, &TransferArgs::default(), false);
        ctx.cache_dir = dir.join("cache");
        ctx.output_dir = dir.to_path_buf();
        ctx
    }

    fn write_list(dir: &Path, file: &str, json: &str) -> PathBuf {
        let path = dir.join(file);
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com/list.json"));
        assert!(is_remote("HTTP://example.com/list.json"));
        assert!(!is_remote("lists/games.json"));
        assert!(!is_remote("ftp://example.com/list.json"));
    }

    #[test]
    fn test_format_entry_row_skips_missing_columns() {
        let entry = DownloadEntry {
            title: Some("Alpha".to_string()),
            file_size: Some("2 GB".to_string()),
            rating: Some(2),
            ..DownloadEntry::default()
        };
        assert_eq!(format_entry_row(3, &entry), "    3  Alpha  2 GB  ★★☆☆☆");
        assert_eq!(
            format_entry_row(12, &DownloadEntry::default()),
            "   12  Untitled"
        );
    }

    #[tokio::test]
    async fn test_load_list_from_path_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_list("does-not-exist.json", &ctx(dir.path()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does-not-exist.json"));
    }

    #[test]
    fn test_merge_command_writes_merged_list() {
        let dir = TempDir::new().unwrap();
        let a = write_list(
            dir.path(),
            "a.json",
            r#"{"name": "A", "downloads": [{"title": "One", "uris": []}]}"#,
        );
        let b = write_list(
            dir.path(),
            "b.json",
            r#"{"name": "B", "downloads": [{"title": "One", "uris": []}, {"title": "Two", "uris": []}]}"#,
        );
        let output = dir.path().join("merged.json");

        run_merge_command(&MergeArgs {
            inputs: vec![a, b],
            output: output.clone(),
        })
        .unwrap();

        let merged = DownloadList::load(&output).unwrap();
        assert_eq!(merged.display_name(), "A");
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_merge_command_rejects_single_input() {
        let dir = TempDir::new().unwrap();
        let a = write_list(dir.path(), "a.json", r#"{"name": "A", "downloads": []}"#);

        let err = run_merge_command(&MergeArgs {
            inputs: vec![a],
            output: dir.path().join("merged.json"),
        })
        .unwrap_err();

        assert!(err.to_string().contains("at least two lists"));
        assert!(!dir.path().join("merged.json").exists());
    }

    #[test]
    fn test_new_command_uses_untitled_for_blank_name() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("new.json");

        run_new_command(&NewArgs {
            name: "   ".to_string(),
            output: output.clone(),
        })
        .unwrap();

        let list = DownloadList::load(&output).unwrap();
        assert_eq!(list.name.as_deref(), Some("Untitled"));
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn test_export_command_strips_ratings() {
        let dir = TempDir::new().unwrap();
        let input = write_list(
            dir.path(),
            "rated.json",
            r#"{"name": "R", "downloads": [{"title": "One", "uris": [], "rating": 5}]}"#,
        );
        let output = dir.path().join("export.json");

        run_export_command(
            &ExportArgs {
                list: input.display().to_string(),
                output: output.clone(),
            },
            &ctx(dir.path()),
        )
        .await
        .unwrap();

        let exported = std::fs::read_to_string(&output).unwrap();
        assert!(!exported.contains("rating"));
        assert!(exported.contains("\"title\": \"One\""));
    }
}
