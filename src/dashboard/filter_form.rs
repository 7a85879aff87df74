use maud::{Markup, html};

use crate::{
    dashboard::query::AnalysisQuery,
    endpoints,
    expenses::FacetOptions,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE},
};

const SELECT_STYLE: &str = "block w-full p-2.5 rounded text-sm min-h-[8rem] \
    text-gray-900 dark:text-white bg-gray-50 dark:bg-gray-700 border \
    border-gray-300 dark:border-gray-600 focus:ring-green-600 focus:border-green-600";

const INPUT_ERROR_STYLE: &str = "mt-1 text-sm text-red-600 dark:text-red-500";

/// Which threshold inputs could not be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct InvalidThresholds {
    pub income: bool,
    pub budget: bool,
}

/// An option of a facet select.
struct FacetOption {
    value: String,
    label: String,
    selected: bool,
}

/// Renders the form that narrows the analysis down and sets the thresholds.
///
/// The form reloads the page with the choices in the query string, so the
/// current analysis can be bookmarked and exported.
pub(super) fn filter_form_view(
    facets: &FacetOptions,
    query: &AnalysisQuery,
    invalid: InvalidThresholds,
) -> Markup {
    let years = facets
        .years
        .iter()
        .map(|year| FacetOption {
            value: year.to_string(),
            label: year.to_string(),
            selected: query.years.contains(year),
        })
        .collect::<Vec<_>>();
    let months = facets
        .months
        .iter()
        .map(|month| FacetOption {
            value: month.number().to_string(),
            label: month.name().to_owned(),
            selected: query.months.contains(&month.number()),
        })
        .collect::<Vec<_>>();
    let categories = text_options(&facets.categories, &query.categories);
    let descriptions = text_options(&facets.descriptions, &query.descriptions);

    html! {
        form
            id="filter-form"
            method="get"
            action=(endpoints::ANALYSIS_VIEW)
            class="w-full mb-8 bg-gray-50 dark:bg-gray-800 p-4 rounded-lg"
        {
            h3 class="text-xl font-semibold mb-4" { "Filtros" }

            p class="text-sm text-gray-600 dark:text-gray-400 mb-3"
            {
                "Segure Ctrl (ou Cmd) para escolher mais de uma opção. \
                Sem nenhuma opção escolhida, todos os gastos são considerados."
            }

            div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4 mb-4"
            {
                (facet_select("year", "Ano", &years))
                (facet_select("month", "Mês", &months))
                (facet_select("category", "Tipo", &categories))
                (facet_select("description", "Descrição", &descriptions))
            }

            div class="grid grid-cols-1 sm:grid-cols-2 gap-4 mb-4"
            {
                (threshold_input("income", "Renda mensal", query.income.as_deref(), invalid.income))
                (threshold_input("budget", "Limite de gastos mensal", query.budget.as_deref(), invalid.budget))
            }

            div class="flex items-center gap-4"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Aplicar" }

                a href=(endpoints::ANALYSIS_VIEW) class={(LINK_STYLE) " whitespace-nowrap"} {
                    "Limpar filtros"
                }
            }
        }
    }
}

fn text_options(values: &[String], selected: &[String]) -> Vec<FacetOption> {
    values
        .iter()
        .map(|value| FacetOption {
            value: value.clone(),
            label: value.clone(),
            selected: selected.contains(value),
        })
        .collect()
}

fn facet_select(name: &str, label: &str, options: &[FacetOption]) -> Markup {
    let id = format!("filter-{name}");

    html! {
        div
        {
            label for=(id) class=(FORM_LABEL_STYLE) { (label) }

            select id=(id) name=(name) multiple class=(SELECT_STYLE)
            {
                @for facet_option in options {
                    option value=(facet_option.value) selected[facet_option.selected] {
                        (facet_option.label)
                    }
                }
            }
        }
    }
}

fn threshold_input(name: &str, label: &str, value: Option<&str>, is_invalid: bool) -> Markup {
    let id = format!("threshold-{name}");

    html! {
        div
        {
            label for=(id) class=(FORM_LABEL_STYLE) { (label) }

            div class="input-wrapper"
            {
                input
                    id=(id)
                    type="text"
                    inputmode="decimal"
                    name=(name)
                    value=[value]
                    placeholder="0,00"
                    aria-invalid=[is_invalid.then_some("true")]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if is_invalid {
                p class=(INPUT_ERROR_STYLE)
                {
                    "Informe um número entre 0 e 1 trilhão, por exemplo 1500,00. \
                    O valor foi considerado como zero."
                }
            }
        }
    }
}
