fn main() {
    #[cfg(target_arch = "wasm32")]
    {
        wasm_bindgen_futures::spawn_local(async move {
            scroll_scene_engine::run();
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        scroll_scene_engine::run();
    }
}
