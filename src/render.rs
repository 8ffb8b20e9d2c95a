//! Renders a [`GroupedBadgeWall`] into a static HTML document and writes it to disk.

#![cfg(feature = "client")]

use std::{
    borrow::Cow,
    ffi::OsString,
    path::{Path, PathBuf},
};

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::{
    WallError, WallResult,
    aggregate::{Badge, BadgeGroup, GroupedBadgeWall, RepoBadges},
};

/// Where the wall is written by default, relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "docs/index.html";

/// The default page title and top-level heading.
pub const DEFAULT_TITLE: &str = "GitHub Workflow Status Wall";

const STYLES: &str = include_str!("../assets/styles.css");
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Escapes the characters that are significant in HTML text and attribute values.
pub fn escape_html(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 16);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Renders a [`GroupedBadgeWall`] into HTML.
#[derive(Debug, Clone)]
pub struct WallRenderer {
    title: String,
}

impl Default for WallRenderer {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_owned(),
        }
    }
}

impl WallRenderer {
    /// Creates a renderer with [`DEFAULT_TITLE`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the page title.
    #[must_use]
    pub fn with_title<S>(mut self, title: S) -> Self
    where
        S: Into<String>,
    {
        self.title = title.into();
        self
    }

    /// Renders the wall, stamping it with `now`.
    ///
    /// The output depends on nothing but the arguments.
    pub fn render(&self, wall: &GroupedBadgeWall, now: NaiveDateTime) -> String {
        let title = escape_html(&self.title);
        let content: String = wall.groups().iter().map(render_group).collect();
        let timestamp = now.format(TIMESTAMP_FORMAT);

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
{STYLES}    </style>
</head>
<body>
    <h1>{title}</h1>
{content}    <div class="updated-at">
        Last updated: {timestamp}
    </div>
</body>
</html>
"#
        )
    }
}

fn render_group(group: &BadgeGroup) -> String {
    let repositories: String = group.repositories().iter().map(render_repo).collect();
    format!(
        r#"    <div class="group-section">
        <h2>{}</h2>
        <div class="repos-container">
{repositories}        </div>
    </div>
"#,
        escape_html(group.name())
    )
}

fn render_repo(repo: &RepoBadges) -> String {
    let badges: String = repo.badges().iter().map(render_badge).collect();
    format!(
        r#"            <div class="repo-section">
                <h3>{}</h3>
                <div class="badge-container">
{badges}                </div>
            </div>
"#,
        escape_html(repo.repo())
    )
}

fn render_badge(badge: &Badge) -> String {
    let state = match &badge.state {
        Some(state) => format!(r#" data-state="{}""#, escape_html(state)),
        None => String::new(),
    };
    format!(
        r#"                    <a href="{}" target="_blank" rel="noopener" class="badge"{state}>
                        <img src="{}" alt="{} workflow status" />
                    </a>
"#,
        escape_html(&badge.link),
        escape_html(&badge.url),
        escape_html(&badge.name),
    )
}

/// Writes the rendered wall to `path`, creating missing parent directories.
///
/// The document is written to a sibling temporary file first and renamed over `path`, so an interrupted run never
/// leaves a truncated wall behind.
///
/// # Errors
///
/// Returns [`WallError::RenderWriteFailed`] if any step fails.
pub async fn write<P>(html: &str, path: P) -> WallResult<()>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let failed = |source: std::io::Error| WallError::RenderWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(failed)?;
    }

    let temporary = temporary_path(path);
    debug!("writing {} bytes to {}…", html.len(), temporary.display());
    tokio::fs::write(&temporary, html).await.map_err(failed)?;

    if let Err(err) = tokio::fs::rename(&temporary, path).await {
        drop(tokio::fs::remove_file(&temporary).await);
        return Err(failed(err));
    }

    info!("generated badge wall at {}", path.display());
    Ok(())
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(|| OsString::from("index.html"), OsString::from);
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::{WallRenderer, escape_html, temporary_path, write};
    use crate::{
        WallError,
        aggregate::{Badge, BadgeGroup, GroupedBadgeWall, RepoBadges},
    };

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 3)
            .unwrap()
    }

    fn badge(name: &str) -> Badge {
        Badge {
            url: String::from("https://example.com/badge.svg"),
            link: String::from("https://example.com/workflow"),
            name: name.to_owned(),
            state: Some(String::from("active")),
        }
    }

    fn wall(group: &str, repo: &str, badge_name: &str) -> GroupedBadgeWall {
        let repo = RepoBadges::new(repo, vec![badge(badge_name)]).unwrap();
        BadgeGroup::new(group, vec![repo]).into_iter().collect()
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("plain"), "plain");
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn empty_wall_keeps_heading_and_timestamp() {
        let html = WallRenderer::new().render(&GroupedBadgeWall::default(), now());

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h1>GitHub Workflow Status Wall</h1>"));
        assert!(html.contains("Last updated: 2024-03-09 07:05:03"));
        assert!(!html.contains("group-section\""));
        assert!(!html.contains("repo-section\""));
    }

    #[test]
    fn renders_sections_and_badges() {
        let html = WallRenderer::new().render(&wall("Backend", "test-repo", "Test Workflow"), now());

        assert!(html.contains("<h2>Backend</h2>"));
        assert!(html.contains("<h3>test-repo</h3>"));
        assert!(html.contains(r#"<a href="https://example.com/workflow" target="_blank""#));
        assert!(html.contains(r#"<img src="https://example.com/badge.svg""#));
        assert!(html.contains(r#"alt="Test Workflow workflow status""#));
        assert!(html.contains(r#"data-state="active""#));
        assert!(html.find("<h2>Backend</h2>") < html.find("<h3>test-repo</h3>"));
    }

    #[test]
    fn rendering_is_idempotent() {
        let wall = wall("Backend", "api", "CI");
        let renderer = WallRenderer::new();
        assert_eq!(renderer.render(&wall, now()), renderer.render(&wall, now()));
    }

    #[test]
    fn hostile_names_do_not_break_markup() {
        let html = WallRenderer::new().render(
            &wall("<Ops & \"Infra\">", "<script>alert(1)</script>", "Build \"all\" & <test>"),
            now(),
        );

        assert!(!html.contains("<script>"));
        assert!(html.contains("<h2>&lt;Ops &amp; &quot;Infra&quot;&gt;</h2>"));
        assert!(html.contains("<h3>&lt;script&gt;alert(1)&lt;/script&gt;</h3>"));
        assert!(html.contains(
            r#"alt="Build &quot;all&quot; &amp; &lt;test&gt; workflow status""#
        ));
        assert_eq!(html.matches("<h3>").count(), 1);
        assert_eq!(html.matches("</h3>").count(), 1);
    }

    #[test]
    fn custom_title_is_used() {
        let html = WallRenderer::new()
            .with_title("Acme CI")
            .render(&GroupedBadgeWall::default(), now());
        assert!(html.contains("<title>Acme CI</title>"));
        assert!(html.contains("<h1>Acme CI</h1>"));
    }

    #[test]
    fn temporary_file_is_a_sibling() {
        assert_eq!(
            temporary_path("docs/index.html".as_ref()),
            std::path::Path::new("docs/index.html.tmp")
        );
    }

    #[tokio::test]
    async fn write_creates_parents_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs").join("index.html");

        write("first", &path).await.unwrap();
        write("second", &path).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        assert!(!dir.path().join("docs").join("index.html.tmp").exists());
    }

    #[tokio::test]
    async fn unwritable_target_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("docs");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = write("html", blocker.join("index.html")).await.unwrap_err();
        assert!(matches!(err, WallError::RenderWriteFailed { .. }));
    }
}
