//! Card components for the headline metrics of the analysis.
//!
//! Shows the latest month's spending, the change from the month before, the
//! mean monthly spending and how the latest month compares to the budget
//! limit and the income.

use maud::{Markup, html};
use rust_decimal::Decimal;

use crate::{
    config::DisplayConfig,
    expenses::{BudgetStatus, IncomeStatus, PeriodComparison, SummaryMetrics, Thresholds},
    html::{CARD_STYLE, format_currency},
};

const TEXT_RED_STYLE: &str = "text-red-600 dark:text-red-400";
const TEXT_GREEN_STYLE: &str = "text-green-600 dark:text-green-400";
const TEXT_MUTED_STYLE: &str = "text-sm text-gray-600 dark:text-gray-400";

/// Shown instead of a value that cannot be computed.
const NOT_AVAILABLE: &str = "N/A";

/// Renders the summary cards section.
pub(super) fn summary_cards_view(
    summary: &SummaryMetrics,
    thresholds: Thresholds,
    display: &DisplayConfig,
) -> Markup {
    html! {
        section id="summary" class="w-full mx-auto mt-8 mb-8" {
            div class="flex justify-between items-baseline mb-4" {
                h3 class="text-xl font-semibold" {
                    "Resumo"
                }
                span class=(TEXT_MUTED_STYLE) {
                    "Último mês: " (summary.latest_period)
                }
            }

            div class="grid grid-cols-1 sm:grid-cols-2 md:grid-cols-3 lg:grid-cols-4 gap-4" {
                (card(
                    "latest-month",
                    "Gasto do último mês",
                    html! { (format_currency(summary.latest_total, display)) },
                    html! { (summary.latest_period) },
                ))

                (previous_month_card(summary, display))
                (delta_card(summary, display))

                (card(
                    "mean-spend",
                    "Média mensal",
                    html! { (format_currency(summary.mean_spend, display)) },
                    html! {
                        @if summary.period_count == 1 {
                            "Em 1 mês"
                        } @else {
                            "Em " (summary.period_count) " meses"
                        }
                    },
                ))

                (budget_card(summary, thresholds.budget_limit, display))
                (income_card(summary, thresholds.income, display))
            }
        }
    }
}

fn card(id: &str, title: &str, value: Markup, footer: Markup) -> Markup {
    html! {
        div id=(id) class={(CARD_STYLE) " flex flex-col justify-between"} {
            h4 class="text-lg font-semibold mb-3 truncate" title=(title) {
                (title)
            }

            div class="text-3xl font-bold mb-1 card-value" {
                (value)
            }

            div class=(TEXT_MUTED_STYLE) {
                (footer)
            }
        }
    }
}

fn previous_month_card(summary: &SummaryMetrics, display: &DisplayConfig) -> Markup {
    match summary.comparison {
        PeriodComparison::Available {
            prior_period,
            prior_total,
            ..
        } => card(
            "previous-month",
            "Gasto do mês anterior",
            html! { (format_currency(prior_total, display)) },
            html! { (prior_period) },
        ),
        PeriodComparison::InsufficientPeriods => card(
            "previous-month",
            "Gasto do mês anterior",
            html! { (NOT_AVAILABLE) },
            html! { "Não há mês anterior com gastos" },
        ),
    }
}

fn delta_card(summary: &SummaryMetrics, display: &DisplayConfig) -> Markup {
    let Some(delta) = summary.delta() else {
        return card(
            "delta",
            "Variação",
            html! { (NOT_AVAILABLE) },
            html! { "Envie mais de um mês de gastos para comparar" },
        );
    };

    let (sign, style, footer) = if delta > Decimal::ZERO {
        ("+", TEXT_RED_STYLE, "↑ Gastou mais que no mês anterior")
    } else if delta < Decimal::ZERO {
        ("", TEXT_GREEN_STYLE, "↓ Gastou menos que no mês anterior")
    } else {
        ("", "", "→ Igual ao mês anterior")
    };

    card(
        "delta",
        "Variação",
        html! { span class=(style) { (sign) (format_currency(delta, display)) } },
        html! { (footer) },
    )
}

fn budget_card(summary: &SummaryMetrics, budget_limit: Decimal, display: &DisplayConfig) -> Markup {
    let variance = summary.budget_variance;
    let amount = format_currency(variance.amount, display);

    let (style, footer) = match variance.status {
        BudgetStatus::Over => (TEXT_RED_STYLE, "Acima do orçamento"),
        BudgetStatus::Under => (TEXT_GREEN_STYLE, "Abaixo do orçamento"),
    };

    card(
        "budget",
        "Orçamento",
        html! { span class=(style) { (amount) } },
        html! { (footer) " de " (format_currency(budget_limit, display)) },
    )
}

fn income_card(summary: &SummaryMetrics, income: Decimal, display: &DisplayConfig) -> Markup {
    let variance = summary.income_variance;
    let amount = format_currency(variance.amount, display);

    let (style, footer) = match variance.status {
        IncomeStatus::Shortfall => (TEXT_RED_STYLE, "Faltou da renda de "),
        IncomeStatus::Surplus => (TEXT_GREEN_STYLE, "Sobrou da renda de "),
    };

    card(
        "income",
        "Renda",
        html! { span class=(style) { (amount) } },
        html! { (footer) (format_currency(income, display)) },
    )
}
