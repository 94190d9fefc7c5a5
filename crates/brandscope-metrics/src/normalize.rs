//! Normalization of loosely-typed provider records into [`RawPost`] and
//! [`ProfileCounts`].
//!
//! Providers disagree on field names (`likesCount` vs `like_count` vs
//! `diggCount`) and on shapes (nested `author.username`, numeric strings,
//! unix milliseconds). Each platform has an ordered priority list per
//! field; the first path that yields a usable value wins. Paths may be
//! dotted to reach into nested objects.

use brandscope_core::{MediaType, Platform, ProfileCounts, RawPost};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

struct FieldChains {
    text: &'static [&'static str],
    author: &'static [&'static str],
    author_followers: &'static [&'static str],
    timestamp: &'static [&'static str],
    likes: &'static [&'static str],
    comments: &'static [&'static str],
    shares: &'static [&'static str],
    media: &'static [&'static str],
    id: &'static [&'static str],
    url: &'static [&'static str],
}

// Title, description, caption, text: first non-empty wins on every platform.
const TEXT_FIELDS: &[&str] = &["title", "description", "caption", "text", "full_text", "message", "desc"];
const ID_FIELDS: &[&str] = &["id", "id_str", "shortCode", "videoId", "postId"];
const URL_FIELDS: &[&str] = &["url", "postUrl", "webVideoUrl", "link", "permalink"];
const LIKE_FIELDS: &[&str] = &[
    "likesCount",
    "like_count",
    "likes",
    "likeCount",
    "diggCount",
    "favorite_count",
    "favoriteCount",
    "reactionsCount",
    "reactions",
];
const COMMENT_FIELDS: &[&str] = &[
    "commentsCount",
    "comment_count",
    "comments",
    "commentCount",
    "reply_count",
    "replyCount",
];
const SHARE_FIELDS: &[&str] = &[
    "sharesCount",
    "share_count",
    "shares",
    "shareCount",
    "retweet_count",
    "retweetCount",
];

const INSTAGRAM: FieldChains = FieldChains {
    text: TEXT_FIELDS,
    author: &["ownerUsername", "owner.username", "username", "author"],
    author_followers: &["ownerFollowersCount", "owner.followersCount", "followersCount"],
    timestamp: &["timestamp", "taken_at", "taken_at_timestamp", "created_time"],
    likes: LIKE_FIELDS,
    comments: COMMENT_FIELDS,
    shares: SHARE_FIELDS,
    media: &["type", "productType", "media_type", "mediaType", "__typename"],
    id: ID_FIELDS,
    url: URL_FIELDS,
};

const TIKTOK: FieldChains = FieldChains {
    text: TEXT_FIELDS,
    author: &["authorMeta.name", "author.uniqueId", "author.unique_id", "author", "username"],
    author_followers: &["authorMeta.fans", "author.followerCount", "authorStats.followerCount"],
    timestamp: &["createTimeISO", "createTime", "create_time", "timestamp"],
    likes: LIKE_FIELDS,
    comments: COMMENT_FIELDS,
    shares: SHARE_FIELDS,
    media: &["type", "mediaType", "imagePost"],
    id: ID_FIELDS,
    url: URL_FIELDS,
};

const TWITTER: FieldChains = FieldChains {
    text: TEXT_FIELDS,
    author: &[
        "author.userName",
        "author.username",
        "user.screen_name",
        "username",
        "author",
    ],
    author_followers: &["author.followers", "user.followers_count", "author.followersCount"],
    timestamp: &["createdAt", "created_at", "timestamp"],
    likes: LIKE_FIELDS,
    comments: COMMENT_FIELDS,
    shares: SHARE_FIELDS,
    media: &["media_type", "mediaType", "extendedEntities.media.0.type", "type"],
    id: ID_FIELDS,
    url: URL_FIELDS,
};

const FACEBOOK: FieldChains = FieldChains {
    text: TEXT_FIELDS,
    author: &["user.name", "pageName", "author.name", "from.name", "author"],
    author_followers: &["user.followers", "pageFollowers", "author.followers"],
    timestamp: &["time", "timestamp", "created_time", "date"],
    likes: LIKE_FIELDS,
    comments: COMMENT_FIELDS,
    shares: SHARE_FIELDS,
    media: &["type", "media_type", "attachments.0.type"],
    id: ID_FIELDS,
    url: URL_FIELDS,
};

const YOUTUBE: FieldChains = FieldChains {
    text: TEXT_FIELDS,
    author: &["channelName", "channel.name", "channelTitle", "author"],
    author_followers: &["numberOfSubscribers", "channel.subscriberCount", "subscriberCount"],
    timestamp: &["publishedAt", "date", "uploadDate", "published"],
    likes: LIKE_FIELDS,
    comments: COMMENT_FIELDS,
    shares: SHARE_FIELDS,
    media: &["type", "mediaType"],
    id: ID_FIELDS,
    url: URL_FIELDS,
};

const PROFILE_FOLLOWERS: &[&str] = &[
    "followersCount",
    "followers_count",
    "followerCount",
    "fans",
    "authorMeta.fans",
    "stats.followerCount",
    "subscriberCount",
    "numberOfSubscribers",
    "followers",
];
const PROFILE_POSTS: &[&str] = &[
    "postsCount",
    "posts_count",
    "media_count",
    "mediaCount",
    "videoCount",
    "video",
    "stats.videoCount",
    "statuses_count",
    "statusesCount",
    "posts",
];
const PROFILE_ENGAGEMENT: &[&str] = &["engagementRate", "engagement_rate", "engagement"];

fn chains(platform: Platform) -> &'static FieldChains {
    match platform {
        Platform::Instagram => &INSTAGRAM,
        Platform::TikTok => &TIKTOK,
        Platform::Twitter => &TWITTER,
        Platform::Facebook => &FACEBOOK,
        Platform::YouTube => &YOUTUBE,
    }
}

/// Normalize every object record; non-object entries are skipped.
#[must_use]
pub fn normalize_posts(platform: Platform, records: &[Value]) -> Vec<RawPost> {
    records
        .iter()
        .filter_map(|record| normalize_post(platform, record))
        .collect()
}

/// Map one provider record to a [`RawPost`]. Returns `None` for non-objects.
#[must_use]
pub fn normalize_post(platform: Platform, record: &Value) -> Option<RawPost> {
    if !record.is_object() {
        return None;
    }
    let fields = chains(platform);

    let text = first_string(record, fields.text).unwrap_or_default();
    let author = first_string(record, fields.author);
    let media_hint = first_media_hint(record, fields.media);

    Some(RawPost {
        platform,
        id: first_string(record, fields.id),
        url: first_string(record, fields.url),
        text,
        author,
        author_followers: first_count(record, fields.author_followers),
        published_at: fields
            .timestamp
            .iter()
            .filter_map(|path| lookup(record, path))
            .find_map(parse_timestamp),
        likes: first_count(record, fields.likes).unwrap_or(0),
        comments: first_count(record, fields.comments).unwrap_or(0),
        shares: first_count(record, fields.shares).unwrap_or(0),
        media_type: MediaType::from_hint(media_hint.as_deref()),
    })
}

/// Extract account-level counters from a provider profile record.
#[must_use]
pub fn normalize_profile(record: &Value) -> ProfileCounts {
    ProfileCounts {
        followers: first_count(record, PROFILE_FOLLOWERS),
        posts: first_count(record, PROFILE_POSTS),
        engagement_rate: PROFILE_ENGAGEMENT
            .iter()
            .filter_map(|path| lookup(record, path))
            .find_map(as_float),
    }
}

/// Parse a timestamp in any of the shapes providers emit.
///
/// Accepts RFC 3339, naive `YYYY-MM-DD[ T]HH:MM:SS` (read as UTC), bare
/// dates, Twitter's `Wed Oct 10 20:19:24 +0000 2018`, and unix epochs in
/// seconds or milliseconds (as numbers or numeric strings).
#[must_use]
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(from_epoch),
        Value::String(s) => parse_timestamp_str(s.trim()),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(epoch) = s.parse::<i64>() {
        return from_epoch(epoch);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%a %b %d %H:%M:%S %z %Y") {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn from_epoch(epoch: i64) -> Option<DateTime<Utc>> {
    // Anything past year ~2286 in seconds is treated as milliseconds.
    if epoch <= 0 {
        None
    } else if epoch > 10_000_000_000 {
        DateTime::from_timestamp_millis(epoch)
    } else {
        DateTime::from_timestamp(epoch, 0)
    }
}

/// Resolve a dotted path; numeric segments index into arrays.
fn lookup<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(record, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn first_string(record: &Value, paths: &[&str]) -> Option<String> {
    paths
        .iter()
        .filter_map(|path| lookup(record, path))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn first_count(record: &Value, paths: &[&str]) -> Option<u64> {
    paths
        .iter()
        .filter_map(|path| lookup(record, path))
        .find_map(as_count)
}

fn first_media_hint(record: &Value, paths: &[&str]) -> Option<String> {
    paths.iter().filter_map(|path| lookup(record, path)).find_map(|v| match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        // TikTok flags slideshow posts with an `imagePost` object.
        Value::Object(_) => Some("carousel".to_string()),
        Value::Bool(true) => Some("carousel".to_string()),
        _ => None,
    })
}

/// Interpret a JSON value as a non-negative count.
///
/// Accepts integers, floats (truncated), and strings such as `"1,234"` or
/// `"12.5K"`. Arrays count their elements (some providers inline comments).
fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(float_to_count)),
        Value::String(s) => parse_count_str(s),
        Value::Array(items) => Some(items.len() as u64),
        _ => None,
    }
}

fn parse_count_str(raw: &str) -> Option<u64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let (digits, multiplier) = match cleaned.chars().last()?.to_ascii_lowercase() {
        'k' => (&cleaned[..cleaned.len() - 1], 1_000.0),
        'm' => (&cleaned[..cleaned.len() - 1], 1_000_000.0),
        'b' => (&cleaned[..cleaned.len() - 1], 1_000_000_000.0),
        _ => (cleaned.as_str(), 1.0),
    };
    let parsed = digits.parse::<f64>().ok().filter(|f| *f >= 0.0)?;
    Some(float_to_count(parsed * multiplier))
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn float_to_count(value: f64) -> u64 {
    value.round() as u64
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
