//! Contracts for the render middleware the store middleware wraps.
//!
//! A render middleware is built per request from a [`Renderable`] and a set
//! of [`RenderOptions`]. It calls the `before` hook before rendering and the
//! `after` hook once rendering is done, handing it a [`Render`] function that
//! re-renders from a new state.

mod hooks;
mod renderable;

pub use hooks::{
    after_hook, before_hook, AfterHook, BeforeHook, Done, Render, RenderCallback, RenderOptions,
};
pub use renderable::{Page, RenderEngine, RenderMiddlewareFactory, Renderable};
