//! The introduction page.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, CARD_STYLE, PAGE_CONTAINER_STYLE, base, link},
    navigation::NavBar,
};

/// Display the introduction page.
pub async fn get_home_page() -> Response {
    home_view().into_response()
}

fn home_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::ROOT).into_html();
    let template_link = link(endpoints::TEMPLATE_VIEW, "Criar Planilha");

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-md space-y-6"
            {
                h1 class="text-3xl font-bold" { "Bem-vindo ao Sapo Saver" }

                p
                {
                    "Envie uma planilha com os seus gastos e veja quanto gastou em cada \
                    mês e em cada tipo de gasto, compare os gastos com a sua renda e o seu \
                    orçamento e baixe a análise como planilha."
                }

                p
                {
                    "Ainda não tem uma planilha? Veja como montar a sua em "
                    (template_link) "."
                }

                div id="privacy" class=(CARD_STYLE)
                {
                    h2 class="text-xl font-semibold mb-2" { "Seus dados são seus" }

                    p class="text-gray-700 dark:text-gray-300"
                    {
                        "A planilha enviada fica apenas na memória do servidor enquanto você \
                        usa o site. Ela nunca é gravada em disco e é apagada quando você a \
                        descarta ou depois de um tempo sem uso."
                    }
                }

                a href=(endpoints::ANALYSIS_VIEW) class={(BUTTON_PRIMARY_STYLE) " block text-center"}
                {
                    "Analisar meus gastos"
                }
            }
        }
    );

    base("Início", &[], &content)
}
