//! LICENSE file and the `license` manifest field

use super::{string_property, Artifact, ModuleContext, ModuleId, ModuleService};
use crate::config::Properties;
use crate::prompt::{non_empty, Choice};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Datelike;
use serde_json::{json, Value};

const LICENSE_FILE: &str = "LICENSE";
const LICENSE_FILES: &[&str] = &[LICENSE_FILE, "LICENSE.md", "LICENSE.txt", "LICENCE"];

const MIT: &str = r#"MIT License

Copyright (c) {year} {author}

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
"#;

const ISC: &str = r#"ISC License

Copyright (c) {year} {author}

Permission to use, copy, modify, and/or distribute this software for any
purpose with or without fee is hereby granted, provided that the above
copyright notice and this permission notice appear in all copies.

THE SOFTWARE IS PROVIDED "AS IS" AND THE AUTHOR DISCLAIMS ALL WARRANTIES
WITH REGARD TO THIS SOFTWARE INCLUDING ALL IMPLIED WARRANTIES OF
MERCHANTABILITY AND FITNESS. IN NO EVENT SHALL THE AUTHOR BE LIABLE FOR
ANY SPECIAL, DIRECT, INDIRECT, OR CONSEQUENTIAL DAMAGES OR ANY DAMAGES
WHATSOEVER RESULTING FROM LOSS OF USE, DATA OR PROFITS, WHETHER IN AN
ACTION OF CONTRACT, NEGLIGENCE OR OTHER TORTIOUS ACTION, ARISING OUT OF
OR IN CONNECTION WITH THE USE OR PERFORMANCE OF THIS SOFTWARE.
"#;

const APACHE: &str = r#"Copyright {year} {author}

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
"#;

/// SPDX identifiers offered
const LICENSES: &[(&str, &str)] = &[("MIT", MIT), ("Apache-2.0", APACHE), ("ISC", ISC)];

fn validate_year(input: &str) -> Result<(), String> {
    let year = input.trim();
    if year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err("Enter a four-digit year".to_string())
    }
}

fn render(template: &str, year: &str, author: &str) -> String {
    template.replace("{year}", year).replace("{author}", author)
}

/// `author` of `package.json`, either `"Name <mail>"` or `{"name": ...}`
fn manifest_author(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => s.split('<').next().map(|name| name.trim().to_string()),
        Value::Object(map) => map.get("name").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
    .filter(|name| !name.is_empty())
}

/// Writes a LICENSE file
#[derive(Debug, Default)]
pub struct LicenseModule;

#[async_trait]
impl ModuleService for LicenseModule {
    fn id(&self) -> ModuleId {
        ModuleId::License
    }

    async fn existing_artifacts(&self, ctx: &ModuleContext<'_>) -> Vec<Artifact> {
        ctx.existing_files(LICENSE_FILES).await
    }

    async fn setup(&self, ctx: &ModuleContext<'_>) -> Result<Properties> {
        let stored = ctx.stored_properties(ModuleId::License).await;
        let mut manifest = ctx.manifest().await?;

        let initial = stored
            .get("type")
            .and_then(Value::as_str)
            .or_else(|| manifest.field("license").and_then(Value::as_str))
            .filter(|id| LICENSES.iter().any(|(spdx, _)| spdx == id))
            .unwrap_or("MIT")
            .to_string();
        let choices: Vec<Choice> = LICENSES
            .iter()
            .map(|(spdx, _)| Choice::new(*spdx, *spdx))
            .collect();
        let license = ctx.select("Which license?", &choices, Some(&initial))?;
        let template = LICENSES
            .iter()
            .find(|(spdx, _)| *spdx == license)
            .map(|(_, template)| *template)
            .ok_or_else(|| anyhow::anyhow!("Unknown license: {}", license))?;

        let default_author = stored
            .get("author")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| manifest_author(manifest.field("author")))
            .unwrap_or_default();
        let author = ctx.text("Copyright holder", &default_author, non_empty)?;
        let author = author.trim().to_string();

        let this_year = chrono::Local::now().year().to_string();
        let year = ctx.text(
            "Copyright year",
            &string_property(&stored, "year", &this_year),
            validate_year,
        )?;
        let year = year.trim().to_string();

        ctx.write(LICENSE_FILE, &render(template, &year, &author))
            .await?;
        manifest.set_field("license", json!(license));
        manifest.save(ctx.fs).await?;

        let mut properties = Properties::new();
        properties.insert("type".to_string(), Value::String(license));
        properties.insert("author".to_string(), Value::String(author));
        properties.insert("year".to_string(), Value::String(year));
        Ok(properties)
    }
}
