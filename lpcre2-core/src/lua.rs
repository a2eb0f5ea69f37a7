//! The `lpcre2` Lua module.
//!
//! ```lua
//! local lpcre2 = require "lpcre2"
//! local code = lpcre2.compile("(\\w+) (\\w+)")
//! local m = code:match("hello world!")
//! print(m:group_count(), m:group("hello world!", 1))
//! print(code:substitute("a-b-c", "+", lpcre2.PCRE2_SUBSTITUTE_GLOBAL))
//! ```
//!
//! Pattern and match objects are userdata; their native resources are
//! released when the collector drops them, on `__close`, or by an explicit
//! `finalize()`.

use std::sync::Arc;

use mlua::prelude::*;

use crate::config::Config;
use crate::error::Error;
use crate::match_result::{MatchResult, NO_MATCH};
use crate::options;
use crate::pattern::Pattern;

impl From<Error> for LuaError {
    fn from(e: Error) -> Self {
        LuaError::RuntimeError(e.to_string())
    }
}

/// Build the module table. Fails if the option table does not agree with
/// the linked engine.
pub fn open(lua: &Lua, config: &Config) -> LuaResult<LuaTable> {
    crate::init()?;
    let config = Arc::new(config.clone());

    let module = lua.create_table()?;
    let cfg = config.clone();
    module.set(
        "compile",
        lua.create_function(move |_, (pattern, opts): (LuaString, Option<u32>)| {
            let pattern = Pattern::compile_with(&pattern.as_bytes(), opts.unwrap_or(0), &cfg)?;
            Ok(LuaPattern { inner: Arc::new(pattern), config: cfg.clone() })
        })?,
    )?;
    for entry in options::TABLE {
        module.set(entry.name, entry.value)?;
    }
    module.set("NO_MATCH", NO_MATCH)?;

    log::debug!("opened lua module `{}`", config.module_name);
    Ok(module)
}

/// Make the module loadable with `require`.
pub fn preload(lua: &Lua, config: &Config) -> LuaResult<()> {
    let package: LuaTable = lua.globals().get("package")?;
    let loaders: LuaTable = package.get("preload")?;
    let cfg = config.clone();
    let loader = lua.create_function(move |lua, _: LuaMultiValue| open(lua, &cfg))?;
    loaders.set(config.module_name.as_str(), loader)
}

/// Open the module and store it as a global.
pub fn register_global(lua: &Lua, config: &Config) -> LuaResult<LuaTable> {
    let module = open(lua, config)?;
    lua.globals().set(config.module_name.as_str(), module.clone())?;
    Ok(module)
}

pub struct LuaPattern {
    inner: Arc<Pattern>,
    config: Arc<Config>,
}

impl LuaPattern {
    pub fn pattern(&self) -> &Arc<Pattern> {
        &self.inner
    }
}

impl LuaUserData for LuaPattern {
    fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
        methods.add_method(
            "match",
            |_, this, (subject, offset, opts): (LuaString, Option<usize>, Option<u32>)| {
                let found = this
                    .inner
                    .match_at(&subject.as_bytes(), offset.unwrap_or(0), opts.unwrap_or(0))?;
                Ok(found.map(|m| LuaMatch { inner: Arc::new(m), config: this.config.clone() }))
            },
        );

        methods.add_method(
            "substitute",
            |lua, this, (subject, replacement, opts): (LuaString, LuaString, Option<u32>)| {
                let out = this.inner.substitute(
                    &subject.as_bytes(),
                    &replacement.as_bytes(),
                    opts.unwrap_or(0),
                )?;
                lua.create_string(&out)
            },
        );

        methods.add_method("capture_count", |_, this, ()| Ok(this.inner.capture_count()?));
        methods.add_method("finalize", |_, this, ()| Ok(this.inner.finalize()));

        methods.add_meta_method(LuaMetaMethod::ToString, |_, this, ()| {
            Ok(format!("lpcre2.code({})", this.inner))
        });
        methods.add_meta_method(LuaMetaMethod::Close, |_, this, _: LuaMultiValue| {
            this.inner.finalize();
            Ok(())
        });
    }
}

pub struct LuaMatch {
    inner: Arc<MatchResult>,
    config: Arc<Config>,
}

impl LuaMatch {
    pub fn result(&self) -> &Arc<MatchResult> {
        &self.inner
    }
}

fn group_value(lua: &Lua, group: Option<&[u8]>) -> LuaResult<LuaValue> {
    match group {
        Some(text) => Ok(LuaValue::String(lua.create_string(text)?)),
        None => Ok(LuaValue::Boolean(false)),
    }
}

impl LuaUserData for LuaMatch {
    fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("group", |lua, this, (subject, index): (LuaString, i64)| {
            let bytes = subject.as_bytes();
            match this.inner.group(&bytes, index)? {
                Some(text) => Ok(Some(lua.create_string(text)?)),
                None => Ok(None),
            }
        });

        methods.add_method("all_groups", |lua, this, subject: LuaString| {
            let groups = this.inner.all_groups(&subject.as_bytes())?;
            let mut values = Vec::with_capacity(groups.len());
            for g in &groups {
                values.push(group_value(lua, g.as_deref())?);
            }
            lua.create_sequence_from(values)
        });

        methods.add_method("group_count", |_, this, ()| Ok(this.inner.group_count()));

        methods.add_method("group_offset", |_, this, index: i64| {
            Ok(match this.inner.group_offset(index)? {
                Some((start, end)) => (Some(start), Some(end)),
                None => (None, None),
            })
        });

        methods.add_method("iter", |lua, this, subject: LuaString| {
            let start = this.config.iter_start;
            this.inner.iter_from(&subject.as_bytes(), start)?;

            let result = this.inner.clone();
            let mut next = start.index();
            lua.create_function_mut(move |lua, _: LuaMultiValue| {
                let rc = result.rc();
                if rc <= 0 || next > rc as usize {
                    return Ok((LuaValue::Nil, LuaValue::Nil));
                }
                let index = next;
                next += 1;
                let bytes = subject.as_bytes();
                let text = result.group(&bytes, index as i64)?;
                Ok((LuaValue::Integer(index as i64), group_value(lua, text)?))
            })
        });

        methods.add_method("finalize", |_, this, ()| Ok(this.inner.finalize()));

        methods.add_meta_method(LuaMetaMethod::ToString, |_, this, ()| {
            Ok(format!("lpcre2.match_data({} groups)", this.inner.group_count()))
        });
        methods.add_meta_method(LuaMetaMethod::Close, |_, this, _: LuaMultiValue| {
            this.inner.finalize();
            Ok(())
        });
    }
}
