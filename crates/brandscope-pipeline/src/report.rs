use brandscope_db::NewAnalysisResult;
use brandscope_metrics::{
    BrandAnalysis, BrandEquityRow, BrandKeywordAnalysis, ComparisonTables, ShareOfVoiceAnalysis,
    VoiceMetrics,
};
use serde::{Deserialize, Serialize};

/// Keyword analyses for one brand, one entry per platform with data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandKeywords {
    pub brand: String,
    pub platforms: Vec<BrandKeywordAnalysis>,
}

/// Everything one comparative analysis run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub brand_analyses: Vec<BrandAnalysis>,
    pub brand_equity_data: Vec<BrandEquityRow>,
    pub comparison: ComparisonTables,
    pub keyword_clustering: Vec<BrandKeywords>,
    pub voice_analysis: Vec<VoiceMetrics>,
    pub share_of_voice: ShareOfVoiceAnalysis,
    pub ai_insights: String,
}

impl AnalysisReport {
    /// Serialize every report field independently.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if any field fails to serialize.
    pub fn to_blobs(&self) -> Result<NewAnalysisResult, serde_json::Error> {
        let tables = &self.comparison;
        Ok(NewAnalysisResult {
            brand_analyses: serde_json::to_value(&self.brand_analyses)?,
            brand_equity_data: serde_json::to_value(&self.brand_equity_data)?,
            audience_comparison: serde_json::to_value(&tables.audience_comparison)?,
            post_channel_data: serde_json::to_value(&tables.post_channel_data)?,
            hashtag_analysis: serde_json::to_value(&tables.hashtag_analysis)?,
            post_type_engagement: serde_json::to_value(&tables.post_type_engagement)?,
            post_timing_data: serde_json::to_value(&tables.post_timing_data)?,
            keyword_clustering: serde_json::to_value(&self.keyword_clustering)?,
            voice_analysis: serde_json::to_value(&self.voice_analysis)?,
            share_of_voice: serde_json::to_value(&self.share_of_voice)?,
            additional_metrics: serde_json::to_value(&tables.additional_metrics)?,
            ai_insights: self.ai_insights.clone(),
        })
    }
}
