//! Chart generation and rendering for the analysis page.
//!
//! This module creates interactive ECharts visualizations of the filtered records:
//! - **Spending Chart**: total spent per month
//! - **Category Chart**: total spent per category
//! - **Monthly Category Chart**: stacked bars of each month's spending split by category
//! - **Income Gap Chart**: how far each month's spending was above or below the income
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with corresponding HTML containers and JavaScript initialization code.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Emphasis, EmphasisFocus, ItemStyle,
        JsFunction, Tooltip, Trigger,
    },
    series::{Line, bar},
};
use maud::{Markup, PreEscaped, html};
use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::{
    config::DisplayConfig,
    expenses::{AggregateRow, CategoryPivot, TimeBucket, round_for_display},
    html::HeadElement,
};

/// Where the ECharts library is loaded from.
pub(super) const ECHARTS_URL: &str = "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js";

/// A chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the HTML containers for the charts.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates JavaScript initialization code for the charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

pub(super) fn spending_chart(monthly: &[AggregateRow<TimeBucket>], display: &DisplayConfig) -> Chart {
    let labels: Vec<String> = monthly.iter().map(|row| row.key.short_label()).collect();
    let values: Vec<f64> = monthly.iter().map(|row| chart_value(row.total)).collect();

    Chart::new()
        .title(Title::new().text("Gastos ao longo do tempo").subtext("Total por mês"))
        .tooltip(currency_tooltip(display))
        .grid(default_grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(currency_axis(display))
        .series(Line::new().name("Gastos").data(values))
}

pub(super) fn category_chart(categories: &[AggregateRow<String>], display: &DisplayConfig) -> Chart {
    let labels: Vec<String> = categories.iter().map(|row| row.key.clone()).collect();
    let values: Vec<f64> = categories.iter().map(|row| chart_value(row.total)).collect();

    Chart::new()
        .title(Title::new().text("Gastos por tipo").subtext("Total do período selecionado"))
        .tooltip(currency_tooltip(display))
        .grid(default_grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(currency_axis(display))
        .series(bar::Bar::new().name("Gastos").data(values))
}

pub(super) fn monthly_category_chart(pivot: &CategoryPivot, display: &DisplayConfig) -> Chart {
    let labels: Vec<String> = pivot.buckets().iter().map(TimeBucket::short_label).collect();

    let mut chart = Chart::new()
        .title(
            Title::new()
                .text("Gastos mensais por tipo")
                .subtext("Total por mês, agrupado por tipo")
                .left(20)
                .top("1%"),
        )
        .tooltip(currency_tooltip(display))
        .legend(Legend::new().left(250).top("1%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(90)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(currency_axis(display));

    for (index, category) in pivot.categories().iter().enumerate() {
        let data: Vec<f64> = pivot.column(index).into_iter().map(chart_value).collect();

        chart = chart.series(
            bar::Bar::new()
                .name(category.as_str())
                .stack("Gastos")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(data),
        );
    }

    chart
}

/// The difference between each month's spending and `income`.
///
/// Months where spending reached the income are drawn in red above the axis,
/// the rest in green below it.
pub(super) fn income_gap_chart(
    monthly: &[AggregateRow<TimeBucket>],
    income: Decimal,
    display: &DisplayConfig,
) -> Chart {
    let labels: Vec<String> = monthly.iter().map(|row| row.key.short_label()).collect();
    let (over, under): (Vec<f64>, Vec<f64>) = monthly
        .iter()
        .map(|row| {
            let gap = row.total - income;

            if gap >= Decimal::ZERO {
                (chart_value(gap), 0.0)
            } else {
                (0.0, chart_value(gap))
            }
        })
        .unzip();

    Chart::new()
        .title(Title::new().text("Gastos menos renda").subtext("Diferença por mês"))
        .tooltip(currency_tooltip(display))
        .grid(default_grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(currency_axis(display))
        .series(
            bar::Bar::new()
                .name("Acima da renda")
                .stack("Diferença")
                .item_style(ItemStyle::new().color("red"))
                .data(over),
        )
        .series(
            bar::Bar::new()
                .name("Abaixo da renda")
                .stack("Diferença")
                .item_style(ItemStyle::new().color("green"))
                .data(under),
        )
}

fn chart_value(amount: Decimal) -> f64 {
    round_for_display(amount).to_f64().unwrap_or_default()
}

fn default_grid() -> Grid {
    Grid::new()
        .left("3%")
        .right("4%")
        .bottom("3%")
        .contain_label(true)
}

fn currency_axis(display: &DisplayConfig) -> Axis {
    Axis::new()
        .type_(AxisType::Value)
        .axis_label(AxisLabel::new().formatter(currency_formatter(display)))
}

#[inline]
fn currency_formatter(display: &DisplayConfig) -> JsFunction {
    JsFunction::new_with_args("number", &display.currency_formatter_js())
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip(display: &DisplayConfig) -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter(display))
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use crate::{
        config::DisplayConfig,
        expenses::{AggregateRow, CalendarMonth, TimeBucket},
    };

    use super::{income_gap_chart, spending_chart};

    fn row(month: CalendarMonth, total: &str) -> AggregateRow<TimeBucket> {
        AggregateRow {
            key: TimeBucket::new(2000, month),
            total: Decimal::from_str(total).unwrap(),
        }
    }

    #[test]
    fn spending_chart_uses_month_labels_and_locale() {
        let monthly = vec![
            row(CalendarMonth::January, "100"),
            row(CalendarMonth::February, "70.5"),
        ];

        let options = spending_chart(&monthly, &DisplayConfig::default()).to_string();

        assert!(options.contains("Jan/2000"), "{options}");
        assert!(options.contains("Fev/2000"), "{options}");
        assert!(options.contains("70.5"), "{options}");
        assert!(options.contains("pt-BR"), "{options}");
    }

    #[test]
    fn income_gap_splits_months_above_and_below_income() {
        let monthly = vec![
            row(CalendarMonth::January, "100"),
            row(CalendarMonth::February, "350"),
        ];

        let options =
            income_gap_chart(&monthly, Decimal::from(200), &DisplayConfig::default()).to_string();

        assert!(options.contains("Acima da renda"), "{options}");
        assert!(options.contains("Abaixo da renda"), "{options}");
        assert!(options.contains("150"), "{options}");
        assert!(options.contains("-100"), "{options}");
    }
}
