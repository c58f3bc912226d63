//! Template - The reference portfolio page
//!
//! Builds the document the behaviors were written against: a navbar with a
//! mobile menu, a hero with the typed-text target, content sections with
//! reveal blocks and stat counters, and the contact form.
//!
//! Element ids come from the [`PageConfig`], so a custom configuration and
//! its template always agree.

use crate::config::PageConfig;
use crate::engine::{Document, Element};
use crate::types::ElementId;

/// `(id, nav label)` of every content section, in page order.
pub const SECTIONS: [(&str, &str); 5] = [
    ("home", "Home"),
    ("about", "About"),
    ("projects", "Projects"),
    ("skills", "Skills"),
    ("contact", "Contact"),
];

/// `(label, target)` of the stat counters.
pub const STATS: [(&str, i64); 3] = [
    ("Projects Completed", 50),
    ("Happy Clients", 30),
    ("Years Experience", 5),
];

const PROJECTS: [(&str, &str); 3] = [
    ("Realtime Dashboard", "Streaming analytics with live charts"),
    ("Design System", "Accessible component library"),
    ("AI Assistant", "Conversational support agent"),
];

const SKILLS: [(&str, &str); 3] = [
    ("Frontend", "TypeScript, React, CSS"),
    ("Backend", "Rust, Node.js, PostgreSQL"),
    ("AI", "LLM integration, embeddings, RAG"),
];

/// Build the reference portfolio document.
pub fn portfolio_document(config: &PageConfig) -> Document {
    let mut doc = Document::new();
    let body = doc.body();

    navbar(&mut doc, body, config);
    hero(&mut doc, body, config);
    about(&mut doc, body, config);
    projects(&mut doc, body);
    skills(&mut doc, body);
    contact(&mut doc, body, config);

    doc.append(body, Element::new("footer").height(120.0).text("© Portfolio"));
    doc
}

fn navbar(doc: &mut Document, body: ElementId, config: &PageConfig) {
    let nav = doc.append(
        body,
        Element::new("nav").id(&config.navbar.navbar_id).height(72.0).row(),
    );
    doc.append(nav, Element::new("a").class("nav-logo").attr("href", "#home").text("Portfolio"));

    let menu = doc.append(nav, Element::new("ul").id(&config.menu.menu_id).class("nav-menu").row());
    for (id, label) in SECTIONS {
        let item = doc.append(menu, Element::new("li"));
        doc.append(
            item,
            Element::new("a").class("nav-link").attr("href", format!("#{id}")).text(label),
        );
    }

    doc.append(nav, Element::new("button").id(&config.menu.toggle_id).class("nav-toggle").text("☰"));
}

fn hero(doc: &mut Document, body: ElementId, config: &PageConfig) {
    let home = doc.append(body, Element::new("section").id("home").class("hero").height(760.0));
    doc.append(home, Element::new("h1").text("Hi, I'm Alex"));
    let line = doc.append(home, Element::new("p").class("hero-subtitle").row());
    doc.append(line, Element::new("span").text("I'm a "));
    doc.append(line, Element::new("span").id(&config.typewriter.target_id).class("typed"));
    doc.append(
        home,
        Element::new("a").class("btn").attr("href", "#contact").text("Get in touch"),
    );
}

fn about(doc: &mut Document, body: ElementId, config: &PageConfig) {
    let about = doc.append(body, Element::new("section").id("about"));
    section_title(doc, about, "About Me");
    doc.append(
        about,
        Element::new("p")
            .class("reveal")
            .text("I build fast, accessible web products\nfrom first sketch to production.")
            .height(160.0),
    );

    let stats = doc.append(about, Element::new("div").class("stats").row().height(200.0));
    for (label, target) in STATS {
        let stat = doc.append(stats, Element::new("div").class("stat").class("reveal"));
        doc.append(
            stat,
            Element::new("span")
                .class("stat-number")
                .attr(config.counters.attribute.as_str(), target.to_string())
                .text("0"),
        );
        doc.append(stat, Element::new("span").class("stat-label").text(label));
    }
}

fn projects(doc: &mut Document, body: ElementId) {
    let projects = doc.append(body, Element::new("section").id("projects"));
    section_title(doc, projects, "Projects");
    for (title, blurb) in PROJECTS {
        let card = doc.append(
            projects,
            Element::new("div").class("project-card").class("reveal").height(320.0),
        );
        doc.append(card, Element::new("h3").text(title));
        doc.append(card, Element::new("p").text(blurb));
    }
}

fn skills(doc: &mut Document, body: ElementId) {
    let skills = doc.append(body, Element::new("section").id("skills"));
    section_title(doc, skills, "Skills");
    for (name, list) in SKILLS {
        let category = doc.append(
            skills,
            Element::new("div").class("skill-category").class("reveal").height(200.0),
        );
        doc.append(category, Element::new("h3").text(name));
        doc.append(category, Element::new("p").text(list));
    }
}

fn contact(doc: &mut Document, body: ElementId, config: &PageConfig) {
    let contact = doc.append(body, Element::new("section").id("contact"));
    section_title(doc, contact, "Get In Touch");

    let form = doc.append(
        contact,
        Element::new("form").id(&config.contact.form_id).class("contact-form").class("reveal"),
    );
    for (name, kind, height) in [("name", "text", 56.0), ("email", "email", 56.0)] {
        doc.append(
            form,
            Element::new("input")
                .attr("name", name)
                .attr("type", kind)
                .attr("placeholder", name)
                .height(height),
        );
    }
    doc.append(
        form,
        Element::new("textarea")
            .attr("name", "message")
            .attr("placeholder", "message")
            .height(160.0),
    );
    doc.append(
        form,
        Element::new("button")
            .class("btn")
            .attr("type", "submit")
            .text("Send Message")
            .height(56.0),
    );
}

fn section_title(doc: &mut Document, section: ElementId, title: &str) {
    doc.append(
        section,
        Element::new("h2").class("section-title").class("reveal").text(title).height(96.0),
    );
}
