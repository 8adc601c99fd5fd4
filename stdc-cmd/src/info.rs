use anyhow::{Context, Result};
use handlebars::handlebars_helper;
use serde::Serialize;
use std::{
    io::{stdout, Write},
    path::Path,
};
use stdc::packet::Summary;

use crate::render::read_records;

#[derive(Debug, Clone)]
pub enum Format {
    Json,
    Text,
}

impl clap::ValueEnum for Format {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Json, Self::Text]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            Self::Json => Some(clap::builder::PossibleValue::new("json")),
            Self::Text => Some(clap::builder::PossibleValue::new("text")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct Descriptor {
    descriptor: String,
    name: String,
    count: usize,
    bytes: usize,
}

#[derive(Debug, Clone, Serialize)]
struct Info {
    filename: String,
    total: usize,
    eligible: usize,
    messages: usize,
    descriptors: Vec<Descriptor>,
}

fn summarize(fpath: &Path) -> Result<Info> {
    let mut summary = Summary::default();
    for rec in read_records(fpath)? {
        summary.add(&rec);
    }

    Ok(Info {
        filename: fpath.to_string_lossy().to_string(),
        total: summary.total,
        eligible: summary.eligible,
        messages: summary.messages,
        descriptors: summary
            .descriptors
            .into_iter()
            .map(|(code, d)| Descriptor {
                descriptor: format!("{code:02x}"),
                name: d.name,
                count: d.count,
                bytes: d.bytes,
            })
            .collect(),
    })
}

pub fn info(fpath: &Path, format: &Format) -> Result<()> {
    let info = summarize(fpath)?;

    match format {
        Format::Json => {
            serde_json::to_writer_pretty(stdout(), &info).context("serializing to json")
        }
        Format::Text => {
            let data = render_text(&info).context("serializing info")?;
            stdout()
                .write_all(str::as_bytes(&data))
                .context("writing to stdout")
        }
    }
}

fn render_text(info: &Info) -> Result<String> {
    handlebars_helper!(left_pad: |num: u64, v: Json| {
        let v = match v {
            serde_json::Value::String(s) => s.to_owned(),
            serde_json::Value::Null => String::new(),
            _ => v.to_string()
        };
        let num = usize::try_from(num).unwrap_or_default().max(v.len());
        format!("{v:>num$}")
    });
    handlebars_helper!(right_pad: |num: u64, v: str| {
        let num = usize::try_from(num).unwrap_or_default().max(v.len());
        format!("{v:<num$}")
    });
    let mut hb = handlebars::Handlebars::new();
    hb.register_escape_fn(handlebars::no_escape);
    hb.register_helper("lpad", Box::new(left_pad));
    hb.register_helper("rpad", Box::new(right_pad));
    hb.register_template_string("info", TEXT_TEMPLATE)
        .context("registering template")?;

    hb.render("info", &info).context("rendering text")
}

const TEXT_TEMPLATE: &str = r"{{ filename }}
===============================================================================
Packets:   {{ total }}
Eligible:  {{ eligible }}
Messages:  {{ messages }}
-------------------------------------------------------------------------------
Desc  Name                                      Count      Bytes
-------------------------------------------------------------------------------
{{ #each descriptors }}  {{ descriptor }}  {{ rpad 40 name }}  {{ lpad 5 count }}  {{ lpad 9 bytes }}
{{/each }}
";
