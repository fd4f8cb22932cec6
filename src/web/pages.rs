//! Server-rendered HTML for the public site and the admin login form.

use std::fmt::Write;

use crate::models::{ContactForm, PortfolioCategory, ProjectWithImages};

const STUDIO_NAME: &str = "Studio";

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, categories: &[PortfolioCategory], body: &str) -> String {
    let mut nav = String::new();
    for category in categories {
        let _ = write!(
            nav,
            r#"<a href="/categoria/{}">{}</a>"#,
            escape(&category.slug),
            escape(&category.name)
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | {studio}</title>
</head>
<body>
<header><a href="/">{studio}</a><nav>{nav}<a href="/contato">Contato</a></nav></header>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
        studio = STUDIO_NAME,
        nav = nav,
        body = body
    )
}

fn grid(projects: &[ProjectWithImages]) -> String {
    if projects.is_empty() {
        return r#"<p class="empty">Nenhum projeto publicado.</p>"#.to_string();
    }

    let mut html = String::from(r#"<section class="grid">"#);
    for item in projects {
        let cover = item
            .cover()
            .map(|image| {
                format!(
                    r#"<img src="{}" alt="{}" loading="lazy">"#,
                    escape(&image.url),
                    escape(image.title.as_deref().unwrap_or(&item.project.title))
                )
            })
            .unwrap_or_default();
        let _ = write!(
            html,
            r#"<a class="card" href="/projeto/{}">{}<h2>{}</h2></a>"#,
            item.project.id,
            cover,
            escape(&item.project.title)
        );
    }
    html.push_str("</section>");
    html
}

pub fn home(categories: &[PortfolioCategory], projects: &[ProjectWithImages]) -> String {
    layout("Portfolio", categories, &grid(projects))
}

pub fn category(
    categories: &[PortfolioCategory],
    current: &PortfolioCategory,
    projects: &[ProjectWithImages],
) -> String {
    let body = format!("<h1>{}</h1>\n{}", escape(&current.name), grid(projects));
    layout(&current.name, categories, &body)
}

pub fn project(categories: &[PortfolioCategory], item: &ProjectWithImages) -> String {
    let project = &item.project;
    let mut meta: Vec<String> = Vec::new();
    if let Some(client) = project.client_name.as_deref().filter(|c| !c.is_empty()) {
        meta.push(escape(client));
    }
    if let Some(category) = &item.category_name {
        meta.push(escape(category));
    }
    if let Some(date) = project.project_date {
        meta.push(date.format("%Y").to_string());
    }

    let mut body = format!(
        r#"<a href="/">Voltar</a><h1>{}</h1><p class="meta">{}</p>"#,
        escape(&project.title),
        meta.join(" &bull; ")
    );
    if let Some(description) = project.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = write!(body, r#"<p class="description">{}</p>"#, escape(description));
    }
    body.push_str(r#"<section class="gallery">"#);
    for image in &item.images {
        let _ = write!(
            body,
            r#"<figure><img src="{}" alt="{}"></figure>"#,
            escape(&image.url),
            escape(image.title.as_deref().unwrap_or(&project.title))
        );
    }
    body.push_str("</section>");

    layout(&project.title, categories, &body)
}

/// Contact page with the form prefilled, plus an optional notice.
pub fn contact(
    categories: &[PortfolioCategory],
    form: &ContactForm,
    success: bool,
    error: Option<&str>,
) -> String {
    let mut body = String::from("<h1>Contato</h1>");
    if success {
        body.push_str(r#"<p class="success">Mensagem enviada! Retornaremos em breve.</p>"#);
    }
    if let Some(error) = error {
        let _ = write!(body, r#"<p class="error">{}</p>"#, escape(error));
    }
    let _ = write!(
        body,
        r#"<form method="post" action="/contato">
<label>Nome <input name="name" value="{}" required></label>
<label>E-mail <input type="email" name="email" value="{}" required></label>
<label>Mensagem <textarea name="message" required>{}</textarea></label>
<button type="submit">Enviar</button>
</form>"#,
        escape(&form.name),
        escape(&form.email),
        escape(&form.message)
    );

    layout("Contato", categories, &body)
}

pub fn login(error: Option<&str>) -> String {
    let notice = error
        .map(|e| format!(r#"<p class="error">{}</p>"#, escape(e)))
        .unwrap_or_default();
    let body = format!(
        r#"<h1>Admin</h1>{}
<form method="post" action="/auth/login">
<label>E-mail <input type="email" name="email" required></label>
<label>Senha <input type="password" name="password" required></label>
<button type="submit">Entrar</button>
</form>"#,
        notice
    );
    layout("Login", &[], &body)
}

pub fn not_found() -> String {
    layout("Not found", &[], "<h1>404</h1><p>Página não encontrada.</p>")
}
