//! Analysis page HTTP handler and view rendering.
//!
//! This module contains:
//! - The route handler for the analysis page
//! - HTML view functions for the page with and without an upload
//! - The state used by the handler

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{CookieJar, Query};
use maud::{Markup, html};
use rust_decimal::Decimal;

use crate::{
    AppState, Error,
    config::DisplayConfig,
    dashboard::{
        cards::summary_cards_view,
        charts::{
            DashboardChart, ECHARTS_URL, category_chart, charts_script, charts_view,
            income_gap_chart, monthly_category_chart, spending_chart,
        },
        filter_form::{InvalidThresholds, filter_form_view},
        query::AnalysisQuery,
        tables::{category_pivot_table, monthly_totals_table, records_table},
    },
    endpoints::{self, with_query},
    expenses::{Analysis, Thresholds, format_date},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_SECONDARY_STYLE, CARD_STYLE, HeadElement,
        PAGE_CONTAINER_STYLE, base, currency_input_styles, link,
    },
    navigation::NavBar,
    session::{Ledger, SessionStore, session_id_from_jar},
    upload::upload_form_view,
};

/// The state needed for displaying the analysis page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The uploads of every active session.
    pub sessions: SessionStore,
    /// How amounts are displayed.
    pub display: DisplayConfig,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            sessions: state.sessions.clone(),
            display: state.config.display.clone(),
        }
    }
}

/// Display the analysis of the session's upload, narrowed down by the
/// filters in the query string.
///
/// Shows the upload form if the session has no upload.
pub async fn get_analysis_page(
    State(state): State<DashboardState>,
    jar: CookieJar,
    Query(query): Query<AnalysisQuery>,
) -> Result<Response, Error> {
    let nav_bar = NavBar::new(endpoints::ANALYSIS_VIEW);

    let ledger = match session_id_from_jar(&jar) {
        Some(session_id) => state.sessions.get(session_id)?,
        None => None,
    };

    let Some(ledger) = ledger else {
        return Ok(upload_prompt_view(nav_bar).into_response());
    };

    let income = query
        .income()
        .inspect_err(|error| tracing::debug!("Ignoring threshold: {error}"));
    let budget_limit = query
        .budget_limit()
        .inspect_err(|error| tracing::debug!("Ignoring threshold: {error}"));

    let invalid = InvalidThresholds {
        income: income.is_err(),
        budget: budget_limit.is_err(),
    };
    let thresholds = Thresholds {
        income: income.unwrap_or_default(),
        budget_limit: budget_limit.unwrap_or_default(),
    };

    let analysis = Analysis::run(&ledger.records, &query.criteria(), thresholds);

    Ok(analysis_view(
        nav_bar,
        &ledger,
        &query,
        invalid,
        &analysis,
        thresholds,
        &state.display,
    )
    .into_response())
}

/// Creates the charts of `analysis`.
///
/// The chart options are serialized to JSON for ECharts consumption.
fn build_charts(analysis: &Analysis, income: Decimal, display: &DisplayConfig) -> [DashboardChart; 4] {
    [
        DashboardChart {
            id: "spending-chart",
            options: spending_chart(&analysis.monthly, display).to_string(),
        },
        DashboardChart {
            id: "category-chart",
            options: category_chart(&analysis.categories, display).to_string(),
        },
        DashboardChart {
            id: "monthly-category-chart",
            options: monthly_category_chart(&analysis.pivot, display).to_string(),
        },
        DashboardChart {
            id: "income-gap-chart",
            options: income_gap_chart(&analysis.monthly, income, display).to_string(),
        },
    ]
}

/// Renders the analysis page when the session has no upload.
fn upload_prompt_view(nav_bar: NavBar<'_>) -> Markup {
    let nav_bar = nav_bar.into_html();
    let template_link = link(endpoints::TEMPLATE_VIEW, "Criar Planilha");

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class={(CARD_STYLE) " w-full max-w-md space-y-4"}
            {
                h2 class="text-xl font-bold"
                {
                    "Análise dos Gastos"
                }

                p
                {
                    "Envie sua planilha de gastos para ver o resumo, os gráficos e as \
                    tabelas. Ainda não tem uma planilha? Veja como montar a sua em "
                    (template_link) "."
                }

                (upload_form_view())
            }
        }
    );

    base("Análise dos Gastos", &[], &content)
}

/// Renders the analysis page for an upload.
fn analysis_view(
    nav_bar: NavBar<'_>,
    ledger: &Ledger,
    query: &AnalysisQuery,
    invalid: InvalidThresholds,
    analysis: &Analysis,
    thresholds: Thresholds,
    display: &DisplayConfig,
) -> Markup {
    let nav_bar = nav_bar.into_html();
    let charts = build_charts(analysis, thresholds.income, display);
    let export_url = with_query(endpoints::EXPORT, &query.to_query_string());

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (ledger_header_view(ledger, &export_url))

            (filter_form_view(&ledger.facets, query, invalid))

            @match &analysis.summary {
                Some(summary) => {
                    (summary_cards_view(summary, thresholds, display))

                    (charts_view(&charts))

                    section id="tables" class="w-full mx-auto mb-8"
                    {
                        div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                        {
                            (monthly_totals_table(&analysis.monthly, &analysis.yearly, display))
                            (category_pivot_table(&analysis.pivot, display))
                            (records_table(&analysis.records, display))
                        }
                    }
                }
                None => {
                    (empty_filter_view())

                    section id="tables" class="w-full mx-auto mb-8"
                    {
                        (records_table(&analysis.records, display))
                    }
                }
            }
        }
    );

    let mut head_elements = vec![currency_input_styles(&display.currency_symbol)];

    if !analysis.is_empty() {
        head_elements.push(HeadElement::ScriptLink(ECHARTS_URL.to_owned()));
        head_elements.push(charts_script(&charts));
    }

    base("Análise dos Gastos", &head_elements, &content)
}

fn ledger_header_view(ledger: &Ledger, export_url: &str) -> Markup {
    html! {
        section id="ledger" class="w-full mb-8"
        {
            div class="flex flex-wrap justify-between items-center gap-4"
            {
                div
                {
                    h2 class="text-2xl font-bold" { "Análise dos Gastos" }

                    p class="text-sm text-gray-600 dark:text-gray-400"
                    {
                        (ledger.file_name) " · " (ledger.records.len()) " gastos · enviada em "
                        (format_date(ledger.uploaded_at.date()))
                    }
                }

                div class="flex flex-wrap items-center gap-4"
                {
                    a id="export-link" href=(export_url) class=(BUTTON_SECONDARY_STYLE) download
                    {
                        "Baixar análise (.xlsx)"
                    }

                    button
                        type="button"
                        id="discard-button"
                        hx-post=(endpoints::DISCARD)
                        hx-confirm="Descartar a planilha enviada? Os dados serão apagados do servidor."
                        hx-target-error="#alert-container"
                        hx-swap="outerHTML"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Descartar planilha"
                    }
                }
            }

            details class="mt-4"
            {
                summary class="cursor-pointer text-sm font-medium" { "Enviar outra planilha" }

                div class="mt-4 max-w-md" { (upload_form_view()) }
            }
        }
    }
}

/// Renders the message shown when no records pass the filters.
fn empty_filter_view() -> Markup {
    html! {
        section id="empty-filter" class="w-full mx-auto mt-8 mb-8"
        {
            div class={(CARD_STYLE) " text-center max-w-md mx-auto"}
            {
                h3 class="text-xl font-semibold mb-3" { "Nenhum gasto encontrado" }

                p class="text-gray-700 dark:text-gray-300"
                {
                    "Nenhum gasto corresponde aos filtros escolhidos. \
                    Tente escolher outras opções."
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::{CookieJar, Query};
    use scraper::{Html, Selector};

    use crate::{
        config::DisplayConfig,
        dashboard::query::AnalysisQuery,
        endpoints,
        expenses::{RawTable, load},
        session::{Ledger, SessionId, SessionStore, session_cookie},
        test_utils::{
            assert_hx_endpoint, assert_valid_html, must_get_form, parse_html_document,
            select_texts,
        },
    };

    use super::{DashboardState, get_analysis_page};

    fn example_ledger() -> Ledger {
        let rows = [
            ["01/01/2000", "Almoço", "Alimentação", "100.00"],
            ["10/02/2000", "Cinema", "Lazer", "70.00"],
            ["15/03/2000", "Faculdade", "Educação", "350.00"],
        ];
        let table = RawTable {
            headers: vec!["Data".into(), "Descrição".into(), "Tipo".into(), "Valor".into()],
            rows: rows
                .iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        };

        Ledger::new("gastos.csv".to_owned(), load(&table).unwrap())
    }

    fn get_test_state() -> DashboardState {
        DashboardState {
            sessions: SessionStore::new(Duration::from_secs(60)),
            display: DisplayConfig::default(),
        }
    }

    fn state_with_upload() -> (DashboardState, CookieJar) {
        let state = get_test_state();
        let session_id = SessionId::new();
        state.sessions.insert(session_id, example_ledger()).unwrap();

        (state, CookieJar::new().add(session_cookie(session_id)))
    }

    async fn get_page(state: DashboardState, jar: CookieJar, query: &str) -> Html {
        let query: AnalysisQuery = serde_html_form::from_str(query).unwrap();

        let response = get_analysis_page(State(state), jar, Query(query))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        html
    }

    #[track_caller]
    fn assert_chart_exists(html: &Html, chart_id: &str) {
        let selector = Selector::parse(&format!("#{}", chart_id)).unwrap();
        assert!(
            html.select(&selector).next().is_some(),
            "Chart with id '{}' not found",
            chart_id
        );
    }

    #[track_caller]
    fn assert_table_exists(html: &Html, table_id: &str) {
        let selector = Selector::parse(&format!("table#{table_id}")).unwrap();
        assert!(
            html.select(&selector).next().is_some(),
            "Table with id '{table_id}' not found"
        );
    }

    #[tokio::test]
    async fn shows_upload_form_without_upload() {
        let html = get_page(get_test_state(), CookieJar::new(), "").await;

        let form = must_get_form(&html, "form[enctype='multipart/form-data']");
        assert_hx_endpoint(&form, endpoints::UPLOAD, "hx-post");
        assert!(html.select(&Selector::parse("#charts").unwrap()).next().is_none());
    }

    #[tokio::test]
    async fn unknown_session_shows_upload_form() {
        let jar = CookieJar::new().add(session_cookie(SessionId::new()));

        let html = get_page(get_test_state(), jar, "").await;

        must_get_form(&html, "form[enctype='multipart/form-data']");
    }

    #[tokio::test]
    async fn analysis_page_loads_successfully() {
        let (state, jar) = state_with_upload();

        let html = get_page(state, jar, "").await;

        assert_chart_exists(&html, "spending-chart");
        assert_chart_exists(&html, "category-chart");
        assert_chart_exists(&html, "monthly-category-chart");
        assert_chart_exists(&html, "income-gap-chart");

        assert_table_exists(&html, "monthly-totals");
        assert_table_exists(&html, "category-pivot");
        assert_table_exists(&html, "records");

        assert_eq!(select_texts(&html, "#mean-spend .card-value"), vec!["R$ 173,33"]);
        assert_eq!(select_texts(&html, "table#records tbody tr").len(), 3);
    }

    #[tokio::test]
    async fn filters_records_by_query() {
        let (state, jar) = state_with_upload();

        let html = get_page(state, jar, "category=Lazer&category=Educação").await;

        assert_eq!(
            select_texts(&html, "table#records tbody td:nth-child(3)"),
            vec!["Lazer", "Educação"]
        );
        assert_eq!(select_texts(&html, "#latest-month .card-value"), vec!["R$ 350,00"]);
    }

    #[tokio::test]
    async fn export_link_keeps_filters() {
        let (state, jar) = state_with_upload();

        let html = get_page(state, jar, "year=2000&month=2").await;

        let export_link = html
            .select(&Selector::parse("#export-link").unwrap())
            .next()
            .expect("export link missing");
        assert_eq!(
            export_link.value().attr("href"),
            Some("/api/export?year=2000&month=2")
        );
    }

    #[tokio::test]
    async fn applies_budget_threshold() {
        let (state, jar) = state_with_upload();

        let html = get_page(state, jar, "budget=200").await;

        assert_eq!(select_texts(&html, "#budget .card-value"), vec!["R$ 150,00"]);
    }

    #[tokio::test]
    async fn invalid_threshold_is_reported_and_ignored() {
        let (state, jar) = state_with_upload();

        let html = get_page(state, jar, "income=-5&budget=200").await;

        assert_eq!(
            html.select(&Selector::parse("input[name=income][aria-invalid=true]").unwrap())
                .count(),
            1
        );
        assert_eq!(select_texts(&html, "#income .card-value"), vec!["R$ 350,00"]);
        assert_eq!(select_texts(&html, "#budget .card-value"), vec!["R$ 150,00"]);
    }

    #[tokio::test]
    async fn empty_filter_result_shows_message() {
        let (state, jar) = state_with_upload();

        let html = get_page(state, jar, "year=1999").await;

        assert!(html.select(&Selector::parse("#empty-filter").unwrap()).next().is_some());
        assert!(html.select(&Selector::parse("#charts").unwrap()).next().is_none());
        assert_eq!(select_texts(&html, "table#records tbody tr").len(), 0);
        // The filter form stays so the user can change their selection.
        must_get_form(&html, "#filter-form");
    }

    #[tokio::test]
    async fn shows_discard_button() {
        let (state, jar) = state_with_upload();

        let html = get_page(state, jar, "").await;

        let button = html
            .select(&Selector::parse("#discard-button").unwrap())
            .next()
            .expect("discard button missing");
        assert_eq!(button.value().attr("hx-post"), Some(endpoints::DISCARD));
    }
}
