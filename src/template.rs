//! The page explaining how to fill in a ledger, and the template download.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rust_decimal::Decimal;
use time::{Date, Month};

use crate::{
    Error,
    config::DisplayConfig,
    endpoints,
    expenses::{Column, ExpenseRecord, format_date},
    export::{export_workbook, records_sheet, xlsx_attachment},
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency, link,
    },
    navigation::NavBar,
};

const TEMPLATE_FILE_NAME: &str = "planilha-de-gastos.xlsx";

/// The rows shown on the page and written to the template workbook.
fn example_records() -> Result<Vec<ExpenseRecord>, Error> {
    let rows = [
        ((2000, Month::January, 1), "Almoço", "Alimentação", Decimal::new(10000, 2)),
        ((2000, Month::February, 10), "Cinema", "Lazer", Decimal::new(7000, 2)),
        ((2000, Month::March, 15), "Faculdade", "Educação", Decimal::new(35000, 2)),
    ];

    rows.into_iter()
        .map(|((year, month, day), description, category, amount)| {
            let date = Date::from_calendar_date(year, month, day)
                .map_err(|error| Error::SpreadsheetExport(error.to_string()))?;

            Ok(ExpenseRecord {
                date,
                description: description.to_owned(),
                category: category.to_owned(),
                amount,
            })
        })
        .collect()
}

fn column_instructions(column: Column) -> &'static str {
    match column {
        Column::Date => "O dia do gasto no formato dd/mm/aaaa, por exemplo 05/01/2024.",
        Column::Description => "O que foi comprado ou pago, por exemplo \"Almoço\".",
        Column::Category => {
            "O tipo do gasto, como \"Alimentação\" ou \"Lazer\". Use sempre o mesmo \
            nome para gastos do mesmo tipo."
        }
        Column::Amount => {
            "Quanto foi gasto, sem o símbolo da moeda, por exemplo 100,00 ou 100.00. \
            O valor não pode ser negativo."
        }
    }
}

/// Display the page explaining the columns of a ledger.
pub async fn get_template_page(State(display): State<DisplayConfig>) -> Result<Response, Error> {
    let records = example_records()?;

    Ok(template_view(&records, &display).into_response())
}

/// Download the template workbook with the example rows.
pub async fn download_template() -> Result<Response, Error> {
    let records = example_records()?;
    let bytes = export_workbook(&[records_sheet(&records)])?;

    tracing::debug!("Sending ledger template of {} bytes", bytes.len());

    Ok(xlsx_attachment(TEMPLATE_FILE_NAME, bytes))
}

fn template_view(records: &[ExpenseRecord], display: &DisplayConfig) -> Markup {
    let nav_bar = NavBar::new(endpoints::TEMPLATE_VIEW).into_html();
    let analysis_link = link(endpoints::ANALYSIS_VIEW, "Análise dos Gastos");

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-md space-y-6"
            {
                h2 class="text-2xl font-bold" { "Criar Planilha" }

                p
                {
                    "Monte sua planilha com as quatro colunas abaixo, uma linha por gasto. \
                    Você pode usar o Excel, o LibreOffice ou o Google Planilhas e salvar \
                    como .xlsx, .ods ou .csv. Depois é só enviar o arquivo na página "
                    (analysis_link) "."
                }

                div class="overflow-x-auto rounded-lg shadow"
                {
                    table id="example-table" class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                @for column in Column::ALL {
                                    th scope="col" class=(TABLE_CELL_STYLE) { (column.template_label()) }
                                }
                            }
                        }

                        tbody
                        {
                            @for record in records {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE) { (format_date(record.date)) }
                                    td class=(TABLE_CELL_STYLE) { (record.description) }
                                    td class=(TABLE_CELL_STYLE) { (record.category) }
                                    td class=(TABLE_CELL_STYLE) { (format_currency(record.amount, display)) }
                                }
                            }
                        }
                    }
                }

                div class=(CARD_STYLE)
                {
                    h3 class="text-xl font-semibold mb-4" { "Como preencher cada coluna" }

                    dl id="column-instructions" class="space-y-3"
                    {
                        @for column in Column::ALL {
                            div
                            {
                                dt class="font-semibold" { (column.template_label()) }
                                dd class="text-gray-700 dark:text-gray-300" { (column_instructions(column)) }
                            }
                        }
                    }

                    p class="mt-4 text-sm text-gray-600 dark:text-gray-400"
                    {
                        "Mantenha os nomes das colunas na primeira linha exatamente como no modelo."
                    }
                }

                a
                    id="template-download"
                    href=(endpoints::TEMPLATE_DOWNLOAD)
                    download
                    class={(BUTTON_PRIMARY_STYLE) " block text-center"}
                {
                    "Baixar planilha modelo"
                }
            }
        }
    );

    base("Criar Planilha", &[], &content)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use axum::{extract::State, http::StatusCode};
    use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
    use scraper::Selector;

    use crate::{
        config::DisplayConfig,
        endpoints,
        expenses::{RawTable, load},
        test_utils::{assert_content_type, assert_valid_html, parse_html_document, select_texts},
        upload::{UploadKind, read_table},
    };

    use super::{download_template, get_template_page};

    #[tokio::test]
    async fn page_shows_example_rows() {
        let response = get_template_page(State(DisplayConfig::default()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        assert_eq!(
            select_texts(&html, "#example-table thead th"),
            vec!["Data", "Descrição", "Tipo", "Valor"]
        );
        assert_eq!(
            select_texts(&html, "#example-table tbody tr:first-child td"),
            vec!["01/01/2000", "Almoço", "Alimentação", "R$ 100,00"]
        );
        assert_eq!(select_texts(&html, "#example-table tbody tr").len(), 3);
        assert_eq!(select_texts(&html, "#column-instructions dt").len(), 4);

        let download = html
            .select(&Selector::parse("#template-download").unwrap())
            .next()
            .expect("download link missing");
        assert_eq!(
            download.value().attr("href"),
            Some(endpoints::TEMPLATE_DOWNLOAD)
        );
    }

    #[tokio::test]
    async fn template_has_data_sheet() {
        let response = download_template().await.unwrap();
        assert_content_type(
            &response,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(body.clone())).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Dados"]);

        let range = workbook.worksheet_range("Dados").unwrap();
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("Data".to_owned())));
        assert_eq!(range.get_value((3, 3)), Some(&Data::Float(350.0)));

        // The template can be uploaded as is.
        let table: RawTable = read_table(UploadKind::Workbook, &body).unwrap();
        assert_eq!(load(&table).unwrap().len(), 3);
    }
}
