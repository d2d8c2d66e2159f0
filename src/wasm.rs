//! WebAssembly bindings for lutscii

use crate::aspect::AspectModel;
use crate::convert::{text_size, ConvertOptions, Converter, ImageSource};
use wasm_bindgen::prelude::*;

fn js_err(e: crate::LutsciiError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct WasmConverter {
    converter: Converter,
}

#[wasm_bindgen]
impl WasmConverter {
    /// Create a converter with default options and the `simple` LUT.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WasmConverter, JsValue> {
        let converter = Converter::new(ConvertOptions::default()).map_err(js_err)?;
        Ok(WasmConverter { converter })
    }

    #[wasm_bindgen]
    pub fn set_scale(&mut self, scale: f64) {
        self.converter.set_scale(scale);
    }

    #[wasm_bindgen]
    pub fn set_invert(&mut self, enabled: bool) {
        self.converter.set_invert(enabled);
    }

    #[wasm_bindgen]
    pub fn set_equalize(&mut self, enabled: bool) {
        self.converter.set_equalize(enabled);
    }

    /// Built-in LUT name or palette string.
    #[wasm_bindgen]
    pub fn set_lut(&mut self, lut: &str) -> Result<(), JsValue> {
        self.converter.set_lut(lut).map_err(js_err)
    }

    /// Measure glyph aspect with a font loaded by the page.
    #[wasm_bindgen]
    pub fn set_font(&mut self, font_data: &[u8]) -> Result<(), JsValue> {
        let model = AspectModel::from_bytes(font_data).map_err(js_err)?;
        self.converter.set_aspect_model(model);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn aspect_factor(&self) -> f64 {
        self.converter.aspect_factor()
    }

    /// Convert an RGBA buffer (e.g. canvas `ImageData`) to a text block.
    #[wasm_bindgen]
    pub fn convert(&self, image_data: &[u8], width: u32, height: u32) -> Result<String, JsValue> {
        let source = ImageSource::Raw {
            width,
            height,
            channels: 4,
            data: image_data.to_vec(),
        };
        self.converter.convert(source).map_err(js_err)
    }

    /// `[rows, columns]` of a text block.
    #[wasm_bindgen]
    pub fn text_size(text: &str) -> js_sys::Array {
        let (rows, cols) = text_size(text);
        let out = js_sys::Array::new();
        out.push(&JsValue::from(rows as u32));
        out.push(&JsValue::from(cols as u32));
        out
    }
}
