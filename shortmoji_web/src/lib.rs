//! `shortmoji_web`：浏览器内容脚本（wasm）。
//!
//! - 在 document 上以捕获阶段监听 `input` / `keydown` / `mousedown` / `focusin`
//! - 把 DOM 事件转换为 `InputEvent` 交给 `Session`
//! - `Consume` 的键盘/指针事件阻止默认行为
//!
//! 设置由扩展的存储胶水代码通过 `apply_settings` / `apply_settings_change` 推送进来。
pub mod dropdown;
pub mod region;

use std::{cell::RefCell, rc::Rc};

use shortmoji_core::{
    config::{Settings, SettingsChange, SettingsHandle},
    engine::Engine,
    key_event::{Action, InputEvent, Key, PointerTarget},
    processor::ProcessStatus,
    session::Session,
};
use shortmoji_index::EmojiTable;
use wasm_bindgen::{JsCast, JsValue, closure::Closure, prelude::wasm_bindgen};
use web_sys::{Document, Event, HtmlElement, KeyboardEvent, MouseEvent};

use crate::{
    dropdown::{OverlayDropdown, pointer_target},
    region::DomRegion,
};

thread_local! {
    static SETTINGS: SettingsHandle = SettingsHandle::default();
}

struct App {
    session: Session<EmojiTable, DomRegion>,
    /// 下拉框根元素（用于判断指针是否落在下拉框内）
    root: HtmlElement,
}

type Shared = Rc<RefCell<App>>;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let dropdown = OverlayDropdown::install(&document)?;
    let root = dropdown.element().clone();
    let engine = Engine::new(EmojiTable::builtin()).with_settings(SETTINGS.with(Clone::clone));
    let app: Shared = Rc::new(RefCell::new(App {
        session: Session::new(engine, Box::new(dropdown)),
        root,
    }));

    let a = app.clone();
    listen(&document, "input", move |e: Event| on_input(&a, e))?;
    let a = app.clone();
    listen(&document, "keydown", move |e: KeyboardEvent| on_keydown(&a, e))?;
    let a = app.clone();
    listen(&document, "mousedown", move |e: MouseEvent| on_mousedown(&a, e))?;
    let a = app;
    listen(&document, "focusin", move |e: Event| on_focusin(&a, e))?;

    log::debug!("shortmoji content script started");
    Ok(())
}

/// 存储快照：`{"enabled": bool, "autoReplace": bool}`。
#[wasm_bindgen]
pub fn apply_settings(json: &str) {
    let settings = Settings::from_json(json);
    SETTINGS.with(|s| s.set(settings));
}

/// 存储变更通知：`{"autoReplace": {"newValue": bool}}`。
#[wasm_bindgen]
pub fn apply_settings_change(json: &str) {
    let change = SettingsChange::from_storage_json(json);
    SETTINGS.with(|s| s.apply(&change));
}

fn listen<E>(document: &Document, kind: &str, handler: impl FnMut(E) + 'static) -> Result<(), JsValue>
where
    E: wasm_bindgen::convert::FromWasmAbi + 'static,
{
    let closure = Closure::<dyn FnMut(E)>::new(handler);
    document.add_event_listener_with_callback_and_bool(
        kind,
        closure.as_ref().unchecked_ref(),
        true,
    )?;
    closure.forget();
    Ok(())
}

fn on_input(app: &Shared, event: Event) {
    let Some(region) = event.target().and_then(DomRegion::from_target) else {
        return;
    };
    // insertText 会同步派发新的 input 事件；外层仍在处理时忽略
    let Ok(mut app) = app.try_borrow_mut() else {
        return;
    };
    let (_, actions) = app.session.handle(InputEvent::Edit(region));
    trace(&actions);
}

fn on_keydown(app: &Shared, event: KeyboardEvent) {
    let Some(key) = Key::from_dom(&event.key()) else {
        return;
    };
    let Ok(mut app) = app.try_borrow_mut() else {
        return;
    };
    let (status, actions) = app.session.handle(InputEvent::Key(key));
    if status == ProcessStatus::Consume {
        event.prevent_default();
        event.stop_propagation();
    }
    trace(&actions);
}

fn on_mousedown(app: &Shared, event: MouseEvent) {
    let Ok(mut app) = app.try_borrow_mut() else {
        return;
    };
    if !app.session.is_open() {
        return;
    }
    let target = pointer_target(&app.root, event.target());
    let (status, actions) = app.session.handle(InputEvent::PointerDown(target));
    if status == ProcessStatus::Consume {
        // 保持焦点留在可编辑区域
        event.prevent_default();
    }
    trace(&actions);
}

fn on_focusin(app: &Shared, event: Event) {
    let Ok(mut app) = app.try_borrow_mut() else {
        return;
    };
    if !app.session.is_open() {
        return;
    }
    let target = event.target();
    if pointer_target(&app.root, target.clone()) != PointerTarget::Outside {
        return;
    }
    // 非可编辑元素得到焦点同样视为离开锚点区域
    let region = target.and_then(DomRegion::from_target);
    let (_, actions) = app.session.handle(InputEvent::Focus(region));
    trace(&actions);
}

fn trace(actions: &[Action]) {
    for a in actions {
        log::trace!("{a:?}");
    }
}
