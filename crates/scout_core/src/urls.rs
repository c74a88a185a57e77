use url::Url;

pub const LINKEDIN_ORIGIN: &str = "https://www.linkedin.com";
pub const LINKEDIN_FEED_URL: &str = "https://www.linkedin.com/feed";
pub const LINKEDIN_LOGIN_URL: &str = "https://www.linkedin.com/login";

/// Canonical company page URL: `https://www.linkedin.com/company/<slug>`,
/// with sub-pages, query and fragment dropped.
pub fn normalize_company_url(raw: &str) -> Option<String> {
    let slug = company_slug(raw)?;
    Some(format!("{LINKEDIN_ORIGIN}/company/{slug}"))
}

/// `https://linkedin.com/company/example/posts/?x=1` -> `example`.
pub fn company_slug(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    if host != "linkedin.com" && !host.ends_with(".linkedin.com") {
        return None;
    }
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    while let Some(segment) = segments.next() {
        if segment == "company" {
            return segments.next().map(ToOwned::to_owned);
        }
    }
    None
}

pub fn company_jobs_url(company_url: &str) -> String {
    let base = company_url.split(['?', '#']).next().unwrap_or(company_url);
    format!("{}/jobs/", base.trim_end_matches('/'))
}

/// Human-readable name derived from the slug: `epic-win-global` -> `Epic Win Global`.
pub fn company_display_name(company_url: &str) -> String {
    let Some(slug) = company_slug(company_url) else {
        return company_url.to_string();
    };
    slug.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Absolute URL for `reference`, resolved against `base` when relative.
/// Fragment-only, query-only and `javascript:` references resolve to nothing.
pub fn resolve_link(reference: &str, base: &str) -> Option<String> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with('?') || lower.starts_with("javascript:") {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url.into());
    }
    Url::parse(base)
        .ok()
        .and_then(|base| base.join(trimmed).ok())
        .map(Into::into)
}

/// True when `current_url` is inside the area only a signed-in member can see.
pub fn is_member_area(current_url: &str) -> bool {
    current_url.contains("linkedin.com/feed") || current_url.contains("linkedin.com/in/")
}

/// True when navigation bounced to a sign-in wall.
pub fn is_auth_wall(current_url: &str) -> bool {
    let Ok(url) = Url::parse(current_url.trim()) else {
        return false;
    };
    let Some(mut segments) = url.path_segments() else {
        return false;
    };
    segments.any(|segment| {
        let segment = segment.to_ascii_lowercase();
        matches!(segment.as_str(), "login" | "authwall" | "checkpoint")
    })
}
