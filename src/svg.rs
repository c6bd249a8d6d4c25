use crate::stats::StatsSummary;
use std::str::FromStr;

const START_Y: i32 = 30;
const LINE_HEIGHT: i32 = 20;
const LEFT_PADDING: f32 = 15.0;
const AVATAR_SIZE: f32 = 160.0;
const GAP_BETWEEN_COLUMNS: f32 = 25.0;
const RIGHT_PADDING: f32 = 30.0;
const CHAR_WIDTH: f32 = 9.6;
const MIN_RIGHT_COL_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

pub struct ThemeColors {
    pub bg: &'static str,
    pub text: &'static str,
    pub key: &'static str,
    pub value: &'static str,
    pub cc: &'static str,
}

impl Theme {
    pub fn colors(self) -> ThemeColors {
        match self {
            Theme::Dark => ThemeColors {
                bg: "#0d1117",
                text: "#c9d1d9",
                key: "#ffa657",
                value: "#a5d6ff",
                cc: "#616e7f",
            },
            Theme::Light => ThemeColors {
                bg: "#ffffff",
                text: "#24292f",
                key: "#d73a49",
                value: "#0366d6",
                cc: "#6a737d",
            },
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(format!("unknown theme '{other}' (expected dark or light)")),
        }
    }
}

/// Percentile label for a year's commit count
pub fn rank_tier(commits: u64) -> &'static str {
    match commits {
        5000.. => "Top 0.5%",
        2000.. => "Top 1%",
        1000.. => "Top 2%",
        500.. => "Top 5%",
        200.. => "Top 20%",
        50.. => "Top 50%",
        _ => "Top 80%",
    }
}

pub fn power_level(commits: u64) -> &'static str {
    match commits {
        9000.. => "God Mode",
        4000.. => "Super Saiyan",
        2000.. => "Sage Mode",
        1000.. => "Elite Class",
        500.. => "Ninja",
        100.. => "Adventurer",
        _ => "Rookie",
    }
}

// Utilities for building SVG content

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn build_stat_row(key: &str, value: &str, align_width: usize) -> (String, String, String) {
    let key_part = format!("{key}: ");
    let base_len = key_part.chars().count() + value.chars().count();
    let available = align_width.saturating_sub(base_len);

    let dots = match available {
        0 => "".to_string(),
        1 => " ".to_string(),
        2 => ". ".to_string(),
        n => ".".repeat(n),
    };

    (key_part, dots, value.to_string())
}

fn build_header_line(label: &str, align_width: usize) -> String {
    let base = format!("{label} ");
    let dash_count = align_width.saturating_sub(base.chars().count()) + 2;
    format!("{base}{}", "-".repeat(dash_count))
}

enum Line {
    Header(String),
    Blank,
    Stat(String, String),
}

fn card_lines(summary: &StatsSummary) -> Vec<Line> {
    let user = &summary.user;
    let stats = &summary.stats;

    let total_stars: u64 = stats.top_repos.iter().map(|r| r.stars).sum();
    let top_language = stats
        .top_languages
        .first()
        .map(String::as_str)
        .unwrap_or("N/A");

    let mut lines = vec![
        Line::Header(format!("{}@gitwrap {}", user.login, summary.year)),
        Line::Stat("Name".into(), user.name.clone()),
    ];
    if let Some(bio) = user.bio.as_deref().filter(|b| !b.is_empty()) {
        lines.push(Line::Stat("Bio".into(), bio.to_string()));
    }
    lines.extend([
        Line::Stat("Followers".into(), user.followers.to_string()),
        Line::Stat("Following".into(), user.following.to_string()),
        Line::Stat("Public repos".into(), user.public_repos.to_string()),
        Line::Blank,
        Line::Header(format!("- {} in Review", summary.year)),
        Line::Stat("Commits".into(), stats.total_commits.to_string()),
        Line::Stat(
            "Pull requests".into(),
            format!("{} (merged {})", stats.total_prs, stats.merged_prs),
        ),
        Line::Stat(
            "Issues".into(),
            format!("{} (closed {})", stats.total_issues, stats.closed_issues),
        ),
        Line::Stat("Active repos".into(), stats.repos_active.to_string()),
        Line::Stat("Top language".into(), top_language.to_string()),
        Line::Stat("Languages".into(), stats.top_languages.join(", ")),
        Line::Stat("Stars".into(), total_stars.to_string()),
        Line::Stat("Rank".into(), rank_tier(stats.total_commits).to_string()),
        Line::Stat("Power level".into(), power_level(stats.total_commits).to_string()),
    ]);

    if !stats.top_repos.is_empty() {
        lines.push(Line::Blank);
        lines.push(Line::Header("- Top Repositories".to_string()));
        for repo in &stats.top_repos {
            let value = match &repo.language {
                Some(lang) => format!("{} stars ({lang})", repo.stars),
                None => format!("{} stars", repo.stars),
            };
            lines.push(Line::Stat(repo.name.clone(), value));
        }
    }

    lines
}

// Builds the right column content and returns (tspans, width, height)

fn build_right_column(summary: &StatsSummary, left_width_px: f32) -> (String, f32, f32) {
    let lines = card_lines(summary);

    let align_width = lines
        .iter()
        .map(|line| match line {
            Line::Stat(k, v) => k.chars().count() + 2 + v.chars().count(),
            Line::Header(h) => h.chars().count(),
            Line::Blank => 0,
        })
        .max()
        .unwrap_or(0)
        .max(MIN_RIGHT_COL_CHARS);

    let right_x = left_width_px + GAP_BETWEEN_COLUMNS;
    let mut right_tspans = String::new();

    for (i, line) in lines.iter().enumerate() {
        let y = START_Y + (i as i32) * LINE_HEIGHT;

        match line {
            Line::Blank => {}
            Line::Header(text) => {
                right_tspans.push_str(&format!(
                    r#"<tspan x="{right_x}" y="{y}">{}</tspan>
"#,
                    escape_xml(&build_header_line(text, align_width))
                ));
            }
            Line::Stat(key, value) => {
                let (k, d, v) = build_stat_row(key, value, align_width);
                right_tspans.push_str(&format!(
                    r#"<tspan x="{right_x}" y="{y}" class="cc">. </tspan>
<tspan class="key">{}</tspan><tspan class="cc">{}</tspan><tspan class="value">{}</tspan>
"#,
                    escape_xml(&k),
                    escape_xml(&d),
                    escape_xml(&v)
                ));
            }
        }
    }

    let right_height_px = lines.len() as f32 * LINE_HEIGHT as f32 + START_Y as f32;
    let content_width = right_x + (align_width as f32 + 4.0) * CHAR_WIDTH + RIGHT_PADDING;
    let content_height = right_height_px.max(AVATAR_SIZE + START_Y as f32) + 30.0;

    (right_tspans, content_width, content_height)
}

/// Render the year-in-review card
pub fn generate_svg(summary: &StatsSummary, theme: Theme) -> String {
    let colors = theme.colors();

    let left_width_px = LEFT_PADDING + AVATAR_SIZE;
    let (right_tspans, w, h) = build_right_column(summary, left_width_px);
    let avatar_y = START_Y as f32 - 15.0;

    format!(
        r#"<?xml version='1.0' encoding='UTF-8'?>
<svg xmlns="http://www.w3.org/2000/svg"
     width="{w}px" height="{h}px"
     font-family="ConsolasFallback,Consolas,monospace"
     font-size="16px">

<style>
.key      {{ fill: {key}; }}
.value    {{ fill: {value}; }}
.cc       {{ fill: {cc}; }}
</style>

<rect width="{w}px" height="{h}px" fill="{bg}" rx="15"/>

<!-- AVATAR -->
<clipPath id="avatar-clip">
  <circle cx="{cx}" cy="{cy}" r="{r}"/>
</clipPath>
<image href="{avatar}" x="{LEFT_PADDING}" y="{avatar_y}" width="{AVATAR_SIZE}" height="{AVATAR_SIZE}" clip-path="url(#avatar-clip)"/>

<!-- STATS -->
<text fill="{text}" xml:space="preserve">
{right}
</text>

</svg>
"#,
        w = w,
        h = h,
        bg = colors.bg,
        text = colors.text,
        key = colors.key,
        value = colors.value,
        cc = colors.cc,
        cx = LEFT_PADDING + AVATAR_SIZE / 2.0,
        cy = avatar_y + AVATAR_SIZE / 2.0,
        r = AVATAR_SIZE / 2.0,
        avatar = escape_xml(&summary.user.avatar_url),
        right = right_tspans
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{ActivityStats, TopRepo, UserSummary};

    fn summary() -> StatsSummary {
        StatsSummary {
            year: 2025,
            user: UserSummary {
                login: "octo".to_string(),
                name: "Octo <Cat>".to_string(),
                avatar_url: "https://avatars.example/u?v=4&s=160".to_string(),
                bio: None,
                followers: 10,
                following: 2,
                public_repos: 8,
            },
            stats: ActivityStats {
                total_commits: 512,
                total_prs: 7,
                merged_prs: 5,
                total_issues: 3,
                closed_issues: 1,
                repos_active: 4,
                top_languages: vec!["Rust".to_string(), "Go".to_string()],
                top_repos: vec![
                    TopRepo { name: "wrap".to_string(), stars: 40, language: Some("Rust".to_string()) },
                    TopRepo { name: "notes".to_string(), stars: 2, language: None },
                ],
            },
        }
    }

    #[test]
    fn test_rank_and_power_thresholds() {
        assert_eq!(rank_tier(0), "Top 80%");
        assert_eq!(rank_tier(50), "Top 50%");
        assert_eq!(rank_tier(499), "Top 20%");
        assert_eq!(rank_tier(5000), "Top 0.5%");
        assert_eq!(power_level(99), "Rookie");
        assert_eq!(power_level(100), "Adventurer");
        assert_eq!(power_level(4000), "Super Saiyan");
        assert_eq!(power_level(9001), "God Mode");
    }

    #[test]
    fn test_theme_from_str() {
        assert_eq!("LIGHT".parse::<Theme>(), Ok(Theme::Light));
        assert_eq!("dark".parse::<Theme>(), Ok(Theme::Dark));
        assert!("neon".parse::<Theme>().is_err());
    }

    #[test]
    fn test_stat_row_alignment() {
        let (k, d, v) = build_stat_row("Commits", "512", 20);
        assert_eq!(k, "Commits: ");
        assert_eq!(v, "512");
        assert_eq!(k.len() + d.len() + v.len(), 20);
    }

    #[test]
    fn test_card_content() {
        let svg = generate_svg(&summary(), Theme::Light);
        assert!(svg.contains("octo@gitwrap 2025"));
        assert!(svg.contains("Octo &lt;Cat&gt;"));
        assert!(svg.contains("u?v=4&amp;s=160"));
        assert!(svg.contains("7 (merged 5)"));
        assert!(svg.contains("Ninja"));
        assert!(svg.contains("Top 5%"));
        assert!(svg.contains("42"));
        assert!(svg.contains("2 stars"));
        assert!(svg.contains("#ffffff"));
        assert!(!svg.contains("Bio"));
    }
}
