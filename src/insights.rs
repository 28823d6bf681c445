//! Rule-based business insight generation from sales data and forecasts

use crate::aggregate::{self, GroupBy};
use crate::data::SalesData;
use crate::models::ForecastResult;
use serde::Serialize;

const GROWTH_THRESHOLD_PCT: f64 = 5.0;
const ACCELERATION_MARGIN_PCT: f64 = 5.0;
const RECENT_GROWTH_MONTHS: usize = 3;
const UNDERPERFORMER_RATIO: f64 = 10.0;
const FORECAST_CHANGE_PCT: f64 = 10.0;
const FORECAST_WINDOW_DAYS: usize = 30;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Analysis area an insight belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InsightCategory {
    Growth,
    Seasonality,
    Products,
    Geography,
    Customers,
    Forecast,
}

/// How the finding should be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Favorable finding
    Positive,
    /// Needs attention
    Warning,
    /// Neutral observation
    Info,
}

/// A single structured finding with a recommended action
#[derive(Debug, Clone, Serialize)]
pub struct Insight {
    pub category: InsightCategory,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub recommendation: String,
}

/// Applies the fixed threshold rules to aggregated statistics.
///
/// Each analysis is independent and appends zero or more insights;
/// insertion order within a category is preserved for display.
#[derive(Debug)]
pub struct InsightEngine<'a> {
    data: &'a SalesData,
    forecast: Option<&'a ForecastResult>,
}

impl<'a> InsightEngine<'a> {
    /// Create an engine over a transaction collection
    pub fn new(data: &'a SalesData) -> Self {
        Self {
            data,
            forecast: None,
        }
    }

    /// Supply a forecast so the forecast analysis runs too
    pub fn with_forecast(mut self, forecast: &'a ForecastResult) -> Self {
        self.forecast = Some(forecast);
        self
    }

    /// Run every analysis and collect the findings
    pub fn generate(&self) -> Vec<Insight> {
        let mut insights = Vec::new();
        self.analyze_growth(&mut insights);
        self.analyze_seasonality(&mut insights);
        self.analyze_products(&mut insights);
        self.analyze_regions(&mut insights);
        self.analyze_segments(&mut insights);
        self.analyze_forecast(&mut insights);
        insights
    }

    /// Monthly percent-change trend rules
    fn analyze_growth(&self, insights: &mut Vec<Insight>) {
        let monthly = aggregate::monthly_totals(self.data.transactions());

        // Percent change between consecutive months, skipping a zero base
        let growth_rates: Vec<f64> = monthly
            .windows(2)
            .filter(|pair| pair[0].1 != 0.0)
            .map(|pair| (pair[1].1 - pair[0].1) / pair[0].1 * 100.0)
            .collect();
        if growth_rates.is_empty() {
            return;
        }

        let avg_growth = growth_rates.iter().sum::<f64>() / growth_rates.len() as f64;
        let recent_start = growth_rates.len().saturating_sub(RECENT_GROWTH_MONTHS);
        let recent = &growth_rates[recent_start..];
        let recent_growth = recent.iter().sum::<f64>() / recent.len() as f64;

        if avg_growth > GROWTH_THRESHOLD_PCT {
            insights.push(Insight {
                category: InsightCategory::Growth,
                severity: Severity::Positive,
                title: "Strong Overall Growth".to_string(),
                description: format!("Average monthly growth rate is {:.1}%", avg_growth),
                recommendation: "Scale operations to meet increasing demand".to_string(),
            });
        } else if avg_growth < -GROWTH_THRESHOLD_PCT {
            insights.push(Insight {
                category: InsightCategory::Growth,
                severity: Severity::Warning,
                title: "Declining Sales Trend".to_string(),
                description: format!("Average monthly decline of {:.1}%", avg_growth.abs()),
                recommendation: "Review pricing, marketing, and product mix".to_string(),
            });
        }

        if recent_growth > avg_growth + ACCELERATION_MARGIN_PCT {
            insights.push(Insight {
                category: InsightCategory::Growth,
                severity: Severity::Positive,
                title: "Accelerating Growth".to_string(),
                description: format!(
                    "Recent growth ({:.1}%) exceeds average ({:.1}%)",
                    recent_growth, avg_growth
                ),
                recommendation: "Invest in inventory and marketing to capitalize on momentum"
                    .to_string(),
            });
        }
    }

    /// Peak and low calendar months by mean transaction value
    fn analyze_seasonality(&self, insights: &mut Vec<Insight>) {
        let mut monthly_avg = aggregate::month_of_year_means(self.data.transactions());
        if monthly_avg.is_empty() {
            return;
        }

        monthly_avg.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let peak_names = month_names(monthly_avg.iter().take(3));
        let low_names = month_names(monthly_avg.iter().rev().take(3));

        insights.push(Insight {
            category: InsightCategory::Seasonality,
            severity: Severity::Info,
            title: "Peak Sales Periods".to_string(),
            description: format!("Highest sales occur in {}", peak_names),
            recommendation: format!("Increase inventory and staffing during {}", peak_names),
        });

        insights.push(Insight {
            category: InsightCategory::Seasonality,
            severity: Severity::Info,
            title: "Low Sales Periods".to_string(),
            description: format!("Lowest sales occur in {}", low_names),
            recommendation: format!(
                "Run promotions and marketing campaigns during {}",
                low_names
            ),
        });
    }

    /// Top performer plus an underperformer check gated on a 10x ratio
    fn analyze_products(&self, insights: &mut Vec<Insight>) {
        let stats = aggregate::group_stats(self.data.transactions(), GroupBy::Category);
        let Some(top) = stats.first() else {
            return;
        };

        insights.push(Insight {
            category: InsightCategory::Products,
            severity: Severity::Positive,
            title: format!("{} - Top Performer", top.name),
            description: format!("Generated ETB {:.2} in total sales", top.total_sales),
            recommendation: format!(
                "Expand {} product line and increase marketing investment",
                top.name
            ),
        });

        let Some(bottom) = stats.last() else {
            return;
        };
        if bottom.total_sales > 0.0 && top.total_sales / bottom.total_sales > UNDERPERFORMER_RATIO {
            insights.push(Insight {
                category: InsightCategory::Products,
                severity: Severity::Warning,
                title: format!("{} - Underperforming", bottom.name),
                description: format!(
                    "Only ETB {:.2} in sales (vs ETB {:.2} for top product)",
                    bottom.total_sales, top.total_sales
                ),
                recommendation: format!("Consider discontinuing or repositioning {}", bottom.name),
            });
        }
    }

    /// Leading and trailing regions; the trailing one is always surfaced
    fn analyze_regions(&self, insights: &mut Vec<Insight>) {
        let stats = aggregate::group_stats(self.data.transactions(), GroupBy::Region);
        let (Some(top), Some(bottom)) = (stats.first(), stats.last()) else {
            return;
        };

        insights.push(Insight {
            category: InsightCategory::Geography,
            severity: Severity::Positive,
            title: format!("{} - Top Regional Market", top.name),
            description: format!(
                "Leading region with ETB {:.2} in sales",
                top.total_sales
            ),
            recommendation: format!("Use {} as model for other regions", top.name),
        });

        insights.push(Insight {
            category: InsightCategory::Geography,
            severity: Severity::Warning,
            title: format!("{} - Growth Opportunity", bottom.name),
            description: format!(
                "Underdeveloped market with only ETB {:.2}",
                bottom.total_sales
            ),
            recommendation: format!(
                "Increase marketing and distribution efforts in {}",
                bottom.name
            ),
        });
    }

    /// Primary customer segment by revenue
    fn analyze_segments(&self, insights: &mut Vec<Insight>) {
        let stats = aggregate::group_stats(self.data.transactions(), GroupBy::Segment);
        let Some(top) = stats.first() else {
            return;
        };

        insights.push(Insight {
            category: InsightCategory::Customers,
            severity: Severity::Info,
            title: format!("{} - Primary Customer Base", top.name),
            description: format!(
                "{} generates most revenue with ETB {:.2}",
                top.name, top.total_sales
            ),
            recommendation: format!(
                "Develop loyalty programs and exclusive offers for {} customers",
                top.name
            ),
        });
    }

    /// Recent actuals against the forecast tail
    fn analyze_forecast(&self, insights: &mut Vec<Insight>) {
        let Some(forecast) = self.forecast else {
            return;
        };
        let Ok(daily) = aggregate::daily_series(self.data.transactions()) else {
            return;
        };

        let recent_avg = daily.trailing_mean(FORECAST_WINDOW_DAYS);
        if recent_avg <= 0.0 {
            return;
        }
        let forecast_avg = forecast.trailing_mean(FORECAST_WINDOW_DAYS);
        let change_pct = (forecast_avg - recent_avg) / recent_avg * 100.0;

        let insight = if change_pct > FORECAST_CHANGE_PCT {
            Insight {
                category: InsightCategory::Forecast,
                severity: Severity::Positive,
                title: "Strong Growth Expected".to_string(),
                description: format!(
                    "Forecasted sales {:.1}% higher than current levels",
                    change_pct
                ),
                recommendation: "Prepare for increased demand with inventory and staffing"
                    .to_string(),
            }
        } else if change_pct < -FORECAST_CHANGE_PCT {
            Insight {
                category: InsightCategory::Forecast,
                severity: Severity::Warning,
                title: "Sales Decline Expected".to_string(),
                description: format!(
                    "Forecasted sales {:.1}% lower than current levels",
                    change_pct.abs()
                ),
                recommendation: "Implement promotional campaigns and review pricing strategy"
                    .to_string(),
            }
        } else {
            Insight {
                category: InsightCategory::Forecast,
                severity: Severity::Info,
                title: "Stable Sales Expected".to_string(),
                description: "Forecasted sales remain within 10% of current levels".to_string(),
                recommendation: "Maintain current operations and monitor for changes".to_string(),
            }
        };

        insights.push(insight);
    }
}

fn month_names<'a>(months: impl Iterator<Item = &'a (u32, f64)>) -> String {
    months
        .map(|(month, _)| MONTH_NAMES[(*month as usize).saturating_sub(1) % 12])
        .collect::<Vec<_>>()
        .join(", ")
}
