//! Prompts for feedback annotation.

use crate::models::FeedbackItem;

/// Instructions and reply schema for batch analysis.
const BATCH_PROMPT: &str = r#"You are an AI assistant analyzing user feedback for a product management platform.

Please analyze the following feedback items and provide:
1. A brief overall summary (2-3 sentences)
2. Top 5 key insights or patterns
3. Sentiment analysis for each feedback item (positive, neutral, negative, mixed)
4. Suggested categories for each item (Feature Request, Bug Report, UX, Performance, Design, Documentation, Security, Other)
5. Priority recommendations

Feedback to analyze:
{feedback}

Please respond in JSON format with this structure:
{
  "summary": "Overall summary here",
  "insights": ["insight 1", "insight 2", ...],
  "sentimentDistribution": {
    "positive": count,
    "neutral": count,
    "negative": count,
    "mixed": count
  },
  "itemAnalysis": [
    {
      "feedbackId": index,
      "sentiment": "positive|neutral|negative|mixed",
      "suggestedCategory": "category name",
      "priority": "low|medium|high|critical",
      "keywords": ["keyword1", "keyword2"]
    }
  ],
  "recommendations": ["recommendation 1", "recommendation 2", ...]
}"#;

const SINGLE_PROMPT: &str = r#"Analyze this feedback and categorize it:

Title: {title}
Description: {description}

Respond with JSON containing:
- category: one of (Feature Request, Bug Report, User Experience, Performance, Design, Documentation, Security, Other)
- sentiment: one of (positive, neutral, negative, mixed)
- priority: one of (low, medium, high, critical)
- keywords: array of relevant keywords (max 5)
- summary: brief one-sentence summary

Format: {"category": "", "sentiment": "", "priority": "", "keywords": [], "summary": ""}"#;

const INSIGHTS_PROMPT: &str = r#"Based on these feedback statistics, provide 3-5 actionable insights:

Total Feedback: {total}
Open: {open}
In Progress: {in_progress}
Closed: {closed}

Provide insights in JSON format:
{
  "insights": ["insight 1", "insight 2", ...],
  "trends": ["trend 1", "trend 2", ...],
  "recommendations": ["recommendation 1", "recommendation 2", ...]
}"#;

/// Build the batch analysis prompt. Items are numbered from 1 in batch order.
pub fn batch_prompt(items: &[FeedbackItem]) -> String {
    let feedback = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            format!(
                "Feedback {}:\nTitle: {}\nDescription: {}\nStatus: {}\nVotes: {}\n---",
                index + 1,
                item.title,
                item.description,
                item.status.as_str(),
                item.votes
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    BATCH_PROMPT.replace("{feedback}", &feedback)
}

/// Build the single-item categorization prompt.
pub fn single_prompt(item: &FeedbackItem) -> String {
    SINGLE_PROMPT
        .replace("{title}", &item.title)
        .replace("{description}", &item.description)
}

/// Build the insights prompt from status counts.
pub fn insights_prompt(total: u64, open: u64, in_progress: u64, closed: u64) -> String {
    INSIGHTS_PROMPT
        .replace("{total}", &total.to_string())
        .replace("{open}", &open.to_string())
        .replace("{in_progress}", &in_progress.to_string())
        .replace("{closed}", &closed.to_string())
}
