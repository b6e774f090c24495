use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{AppError, Result};

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#?[0-9A-Fa-f]{6}$").expect("hex color pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    Middle,
    Center,
    Bottom,
}

impl VerticalAlign {
    /// `middle` is what the style page offers, the workbook only knows `center`.
    pub fn normalized(self) -> Self {
        match self {
            Self::Middle => Self::Center,
            other => other,
        }
    }
}

/// Visual parameters applied to every generated workbook.
///
/// Field order is the order the document is written in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    #[serde(rename = "cor_cabecalho")]
    pub header_fill: String,
    #[serde(rename = "cor_fonte_cabecalho")]
    pub header_font_color: String,
    #[serde(rename = "tamanho_fonte_cabecalho")]
    pub header_font_size: u32,
    #[serde(rename = "altura_linhas_cabecalho")]
    pub header_row_height: u32,
    #[serde(rename = "alinhamento_horizontal_cabecalho")]
    pub header_horizontal: HorizontalAlign,
    #[serde(rename = "alinhamento_vertical_cabecalho")]
    pub header_vertical: VerticalAlign,
    #[serde(rename = "cor_fundo_tabela")]
    pub body_fill: String,
    #[serde(rename = "cor_texto_tabela")]
    pub body_font_color: String,
    #[serde(rename = "tamanho_fonte_tabela")]
    pub body_font_size: u32,
    #[serde(rename = "altura_linhas_tabela")]
    pub body_row_height: u32,
    #[serde(rename = "alinhamento_horizontal_texto")]
    pub body_horizontal: HorizontalAlign,
    #[serde(rename = "alinhamento_vertical_texto")]
    pub body_vertical: VerticalAlign,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            header_fill: "0b480b".to_string(),
            header_font_color: "FFFFFF".to_string(),
            header_font_size: 23,
            header_row_height: 30,
            header_horizontal: HorizontalAlign::Center,
            header_vertical: VerticalAlign::Center,
            body_fill: "f9f0f0".to_string(),
            body_font_color: "000000".to_string(),
            body_font_size: 20,
            body_row_height: 16,
            body_horizontal: HorizontalAlign::Center,
            body_vertical: VerticalAlign::Center,
        }
    }
}

impl StyleConfig {
    /// Builds a config from a loosely typed document.
    ///
    /// Missing or ill-typed keys take their default; only a document that is not
    /// a JSON object is rejected.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            AppError::ConfigLoad("o documento deve ser um objeto JSON".to_string())
        })?;
        let d = Self::default();
        Ok(Self {
            header_fill: color(map, "cor_cabecalho").unwrap_or(d.header_fill),
            header_font_color: color(map, "cor_fonte_cabecalho").unwrap_or(d.header_font_color),
            header_font_size: positive(map, "tamanho_fonte_cabecalho")
                .unwrap_or(d.header_font_size),
            header_row_height: positive(map, "altura_linhas_cabecalho")
                .unwrap_or(d.header_row_height),
            header_horizontal: keyword(map, "alinhamento_horizontal_cabecalho")
                .unwrap_or(d.header_horizontal),
            header_vertical: keyword(map, "alinhamento_vertical_cabecalho")
                .unwrap_or(d.header_vertical),
            body_fill: color(map, "cor_fundo_tabela").unwrap_or(d.body_fill),
            body_font_color: color(map, "cor_texto_tabela").unwrap_or(d.body_font_color),
            body_font_size: positive(map, "tamanho_fonte_tabela").unwrap_or(d.body_font_size),
            body_row_height: positive(map, "altura_linhas_tabela").unwrap_or(d.body_row_height),
            body_horizontal: keyword(map, "alinhamento_horizontal_texto")
                .unwrap_or(d.body_horizontal),
            body_vertical: keyword(map, "alinhamento_vertical_texto").unwrap_or(d.body_vertical),
        })
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(&value)
    }

    /// Four-space indented document, the layout the style page has always saved.
    pub fn to_json_pretty(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)?;
        Ok(buffer)
    }
}

pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR.is_match(value)
}

fn color(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .filter(|s| is_hex_color(s))
        .map(String::from)
}

fn positive(map: &Map<String, Value>, key: &str) -> Option<u32> {
    let value = map.get(key)?;
    let n = match value.as_u64() {
        Some(n) => n,
        None => value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0)
            .map(|f| f as u64)?,
    };
    u32::try_from(n).ok().filter(|n| *n > 0)
}

fn keyword<T: serde::de::DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Option<T> {
    let raw = map.get(key)?.as_str()?.trim().to_lowercase();
    serde_json::from_value(Value::String(raw)).ok()
}
