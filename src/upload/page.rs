use maud::{Markup, html};

use crate::{
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, loading_spinner},
};

/// The file types offered by the browser's file picker.
const ACCEPTED_FILE_TYPES: &str = ".csv,.xlsx,.xls,.ods";

/// The form for uploading a ledger.
///
/// On success the endpoint redirects to the analysis page, errors are
/// swapped into the alert container.
pub(crate) fn upload_form_view() -> Markup {
    let upload_route = endpoints::UPLOAD;
    let spinner = loading_spinner();

    html! {
        form
            hx-post=(upload_route)
            enctype="multipart/form-data"
            hx-disabled-elt="#file, #submit-button"
            hx-indicator="#indicator"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="file"
                    class=(FORM_LABEL_STYLE)
                {
                    "Escolha sua planilha de gastos"
                }

                input
                    id="file"
                    type="file"
                    name="file"
                    accept=(ACCEPTED_FILE_TYPES)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                p class="mt-2 text-sm text-gray-600 dark:text-gray-400"
                {
                    "Aceitamos arquivos .xlsx, .xls, .ods e .csv com as colunas \
                    Data, Descrição, Tipo e Valor."
                }
            }

            button
                type="submit"
                id="submit-button"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (spinner) }
                " Enviar planilha"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{ElementRef, Selector};

    use crate::{
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, must_get_form,
            parse_markup,
        },
    };

    use super::{ACCEPTED_FILE_TYPES, upload_form_view};

    #[test]
    fn renders_multipart_upload_form() {
        let html = parse_markup(&upload_form_view());

        let form = must_get_form(&html, "form");
        assert_hx_endpoint(&form, endpoints::UPLOAD, "hx-post");
        assert_form_enctype(&form, "multipart/form-data");
        assert_form_input(&form, "file", "file");
        assert_form_submit_button(&form);
        assert_eq!(
            form.value().attr("hx-target-error"),
            Some("#alert-container")
        );
    }

    #[test]
    fn file_input_is_required_and_filtered() {
        let html = parse_markup(&upload_form_view());
        let input = html
            .select(&Selector::parse("input[name=file]").unwrap())
            .next()
            .expect("file input missing");

        assert!(input.value().attr("required").is_some());
        assert_eq!(input.value().attr("accept"), Some(ACCEPTED_FILE_TYPES));
    }

    #[track_caller]
    fn assert_form_enctype(form: &ElementRef, enctype: &str) {
        let form_enctype = form
            .value()
            .attr("enctype")
            .expect("enctype attribute missing");

        assert_eq!(
            form_enctype, enctype,
            "want form with attribute enctype=\"{enctype}\", got {form_enctype:?}"
        );
    }
}
