//! Database operations for `analysis_results`.
//!
//! Results are append-only: every completed run inserts a new row and
//! readers take the most recent one.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use crate::DbError;

/// One stored report field. Each maps to its own column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultField {
    BrandAnalyses,
    BrandEquityData,
    AudienceComparison,
    PostChannelData,
    HashtagAnalysis,
    PostTypeEngagement,
    PostTimingData,
    KeywordClustering,
    VoiceAnalysis,
    ShareOfVoice,
    AdditionalMetrics,
    AiInsights,
}

impl ResultField {
    pub const ALL: [ResultField; 12] = [
        ResultField::BrandAnalyses,
        ResultField::BrandEquityData,
        ResultField::AudienceComparison,
        ResultField::PostChannelData,
        ResultField::HashtagAnalysis,
        ResultField::PostTypeEngagement,
        ResultField::PostTimingData,
        ResultField::KeywordClustering,
        ResultField::VoiceAnalysis,
        ResultField::ShareOfVoice,
        ResultField::AdditionalMetrics,
        ResultField::AiInsights,
    ];

    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            ResultField::BrandAnalyses => "brand_analyses",
            ResultField::BrandEquityData => "brand_equity_data",
            ResultField::AudienceComparison => "audience_comparison",
            ResultField::PostChannelData => "post_channel_data",
            ResultField::HashtagAnalysis => "hashtag_analysis",
            ResultField::PostTypeEngagement => "post_type_engagement",
            ResultField::PostTimingData => "post_timing_data",
            ResultField::KeywordClustering => "keyword_clustering",
            ResultField::VoiceAnalysis => "voice_analysis",
            ResultField::ShareOfVoice => "share_of_voice",
            ResultField::AdditionalMetrics => "additional_metrics",
            ResultField::AiInsights => "ai_insights",
        }
    }

    /// The report-document key, e.g. `brandEquityData`.
    #[must_use]
    pub fn report_key(self) -> &'static str {
        match self {
            ResultField::BrandAnalyses => "brandAnalyses",
            ResultField::BrandEquityData => "brandEquityData",
            ResultField::AudienceComparison => "audienceComparison",
            ResultField::PostChannelData => "postChannelData",
            ResultField::HashtagAnalysis => "hashtagAnalysis",
            ResultField::PostTypeEngagement => "postTypeEngagement",
            ResultField::PostTimingData => "postTimingData",
            ResultField::KeywordClustering => "keywordClustering",
            ResultField::VoiceAnalysis => "voiceAnalysis",
            ResultField::ShareOfVoice => "shareOfVoice",
            ResultField::AdditionalMetrics => "additionalMetrics",
            ResultField::AiInsights => "aiInsights",
        }
    }
}

impl FromStr for ResultField {
    type Err = String;

    /// Accepts either the column name or the report key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        ResultField::ALL
            .into_iter()
            .find(|f| f.column() == needle || f.report_key() == needle)
            .ok_or_else(|| format!("unknown result field '{needle}'"))
    }
}

/// Serialized report fields for one completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnalysisResult {
    pub brand_analyses: Value,
    pub brand_equity_data: Value,
    pub audience_comparison: Value,
    pub post_channel_data: Value,
    pub hashtag_analysis: Value,
    pub post_type_engagement: Value,
    pub post_timing_data: Value,
    pub keyword_clustering: Value,
    pub voice_analysis: Value,
    pub share_of_voice: Value,
    pub additional_metrics: Value,
    pub ai_insights: String,
}

impl NewAnalysisResult {
    /// The value stored for `field`; insights come back as a JSON string.
    #[must_use]
    pub fn field(&self, field: ResultField) -> Value {
        match field {
            ResultField::BrandAnalyses => self.brand_analyses.clone(),
            ResultField::BrandEquityData => self.brand_equity_data.clone(),
            ResultField::AudienceComparison => self.audience_comparison.clone(),
            ResultField::PostChannelData => self.post_channel_data.clone(),
            ResultField::HashtagAnalysis => self.hashtag_analysis.clone(),
            ResultField::PostTypeEngagement => self.post_type_engagement.clone(),
            ResultField::PostTimingData => self.post_timing_data.clone(),
            ResultField::KeywordClustering => self.keyword_clustering.clone(),
            ResultField::VoiceAnalysis => self.voice_analysis.clone(),
            ResultField::ShareOfVoice => self.share_of_voice.clone(),
            ResultField::AdditionalMetrics => self.additional_metrics.clone(),
            ResultField::AiInsights => Value::String(self.ai_insights.clone()),
        }
    }

    /// The whole report as one JSON object keyed by report key.
    #[must_use]
    pub fn to_document(&self) -> Value {
        Value::Object(
            ResultField::ALL
                .into_iter()
                .map(|f| (f.report_key().to_string(), self.field(f)))
                .collect(),
        )
    }
}

/// A row from the `analysis_results` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnalysisResultRow {
    pub id: i64,
    pub session_id: i64,
    pub brand_analyses: Value,
    pub brand_equity_data: Value,
    pub audience_comparison: Value,
    pub post_channel_data: Value,
    pub hashtag_analysis: Value,
    pub post_type_engagement: Value,
    pub post_timing_data: Value,
    pub keyword_clustering: Value,
    pub voice_analysis: Value,
    pub share_of_voice: Value,
    pub additional_metrics: Value,
    pub ai_insights: String,
    pub created_at: DateTime<Utc>,
}

impl From<AnalysisResultRow> for NewAnalysisResult {
    fn from(row: AnalysisResultRow) -> Self {
        Self {
            brand_analyses: row.brand_analyses,
            brand_equity_data: row.brand_equity_data,
            audience_comparison: row.audience_comparison,
            post_channel_data: row.post_channel_data,
            hashtag_analysis: row.hashtag_analysis,
            post_type_engagement: row.post_type_engagement,
            post_timing_data: row.post_timing_data,
            keyword_clustering: row.keyword_clustering,
            voice_analysis: row.voice_analysis,
            share_of_voice: row.share_of_voice,
            additional_metrics: row.additional_metrics,
            ai_insights: row.ai_insights,
        }
    }
}

const RESULT_COLUMNS: &str = "id, session_id, brand_analyses, brand_equity_data, \
    audience_comparison, post_channel_data, hashtag_analysis, post_type_engagement, \
    post_timing_data, keyword_clustering, voice_analysis, share_of_voice, \
    additional_metrics, ai_insights, created_at";

/// Appends a result row for `session_id` in a single statement.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_result(
    pool: &PgPool,
    session_id: i64,
    result: &NewAnalysisResult,
) -> Result<AnalysisResultRow, DbError> {
    let row = sqlx::query_as::<_, AnalysisResultRow>(&format!(
        "INSERT INTO analysis_results \
             (session_id, brand_analyses, brand_equity_data, audience_comparison, \
              post_channel_data, hashtag_analysis, post_type_engagement, post_timing_data, \
              keyword_clustering, voice_analysis, share_of_voice, additional_metrics, \
              ai_insights) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
         RETURNING {RESULT_COLUMNS}"
    ))
    .bind(session_id)
    .bind(&result.brand_analyses)
    .bind(&result.brand_equity_data)
    .bind(&result.audience_comparison)
    .bind(&result.post_channel_data)
    .bind(&result.hashtag_analysis)
    .bind(&result.post_type_engagement)
    .bind(&result.post_timing_data)
    .bind(&result.keyword_clustering)
    .bind(&result.voice_analysis)
    .bind(&result.share_of_voice)
    .bind(&result.additional_metrics)
    .bind(&result.ai_insights)
    .fetch_one(pool)
    .await?;

    tracing::debug!(session_id, result_id = row.id, "stored analysis result");
    Ok(row)
}

/// The most recent result for `session_id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the session has no result yet, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_latest_result(
    pool: &PgPool,
    session_id: i64,
) -> Result<AnalysisResultRow, DbError> {
    sqlx::query_as::<_, AnalysisResultRow>(&format!(
        "SELECT {RESULT_COLUMNS} FROM analysis_results \
         WHERE session_id = $1 \
         ORDER BY created_at DESC, id DESC \
         LIMIT 1"
    ))
    .bind(session_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Read one field of the most recent result without loading the others.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the session has no result yet, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_result_field(
    pool: &PgPool,
    session_id: i64,
    field: ResultField,
) -> Result<Value, DbError> {
    // Column names come from a closed enum, never from input.
    let sql = format!(
        "SELECT to_jsonb({}) FROM analysis_results \
         WHERE session_id = $1 \
         ORDER BY created_at DESC, id DESC \
         LIMIT 1",
        field.column()
    );
    sqlx::query_scalar::<_, Value>(&sql)
        .bind(session_id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}
