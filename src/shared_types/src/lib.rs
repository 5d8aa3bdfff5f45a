//! TypeScript bindings for the console core are generated by `build.rs`
//! into `generated/typescript`.
