//! JavaScript context bridge
//!
//! Injects the script context into the QuickJS global scope. Data crosses the
//! boundary as JSON text and is rebuilt inside the context by a small prelude,
//! so the script only ever sees plain, frozen JS objects plus the
//! `environment` accessor pair. Nothing from the host is reachable.
//!
//! Variables travel as an ordered list of pairs and live in a `Map`, so keys
//! like `"2"` keep their insertion position. `response.headers` answers
//! lookups in any case; the stored names are lower-case.

use rquickjs::{Ctx, Value};

use crate::errors::WorkbenchError;
use crate::scripting::context::ScriptContext;

const ENV_GLOBAL: &str = "__reqbench_env";
const REQUEST_GLOBAL: &str = "__reqbench_request";
const RESPONSE_GLOBAL: &str = "__reqbench_response";

/// Expression evaluated after the user script to read the variables back
pub const EXPORT_EXPR: &str = "__reqbench_export()";

// Runs before the user script. Captures every builtin it relies on so a
// script that clobbers `JSON` or `String` cannot break the export.
const PRELUDE: &str = r#"
(function (global) {
  'use strict';
  var parse = JSON.parse;
  var stringify = JSON.stringify;
  var toStr = String;
  var lower = String.prototype.toLowerCase;
  var freeze = Object.freeze;
  var names = Object.getOwnPropertyNames;
  var defineProperty = Object.defineProperty;
  var hasOwn = Object.prototype.hasOwnProperty;
  var ProxyCtor = Proxy;
  var MapCtor = Map;
  var mapGet = Map.prototype.get;
  var mapSet = Map.prototype.set;
  var mapHas = Map.prototype.has;
  var mapForEach = Map.prototype.forEach;

  var store = new MapCtor();
  var initial = parse(global.__reqbench_env);
  for (var i = 0; i < initial.length; i++) {
    mapSet.call(store, initial[i][0], initial[i][1]);
  }

  function deepFreeze(value) {
    if (value !== null && typeof value === 'object') {
      var props = names(value);
      for (var j = 0; j < props.length; j++) {
        deepFreeze(value[props[j]]);
      }
      freeze(value);
    }
    return value;
  }

  // Only a get trap: the frozen target answers everything else
  function caseless(headers) {
    return new ProxyCtor(deepFreeze(headers), {
      get: function (target, key) {
        if (typeof key === 'string' && !hasOwn.call(target, key)) {
          var folded = lower.call(key);
          if (hasOwn.call(target, folded)) {
            return target[folded];
          }
        }
        return target[key];
      }
    });
  }

  var environment = freeze({
    get: function (key) {
      key = toStr(key);
      return mapHas.call(store, key) ? mapGet.call(store, key) : '';
    },
    set: function (key, value) {
      mapSet.call(store, toStr(key), toStr(value));
    }
  });
  var request = deepFreeze(parse(global.__reqbench_request));
  var response = parse(global.__reqbench_response);
  if (response !== null && typeof response.headers === 'object' && response.headers !== null) {
    response.headers = caseless(response.headers);
  }
  deepFreeze(response);

  function define(name, value) {
    defineProperty(global, name, { value: value, writable: false, enumerable: false, configurable: false });
  }

  define('environment', environment);
  define('request', request);
  define('response', response);
  define('pm', freeze({ environment: environment, request: request, response: response }));
  define('__reqbench_export', function () {
    var out = [];
    mapForEach.call(store, function (value, key) {
      out[out.length] = [key, toStr(value)];
    });
    return stringify(out);
  });

  delete global.__reqbench_env;
  delete global.__reqbench_request;
  delete global.__reqbench_response;
})(globalThis);
"#;

/// Inject `environment`, `request`, `response` and `pm` into the globals
pub fn inject_context(ctx: &Ctx<'_>, script_ctx: &ScriptContext) -> Result<(), WorkbenchError> {
    let globals = ctx.globals();

    let env_pairs: Vec<(&str, &str)> = script_ctx.env.iter().collect();
    let env_json = serde_json::to_string(&env_pairs)?;
    let request_json = serde_json::to_string(&script_ctx.request)?;
    let response_json = serde_json::to_string(&script_ctx.response)?;

    globals.set(ENV_GLOBAL, env_json)
        .map_err(|e| WorkbenchError::Script(format!("Failed to set environment global: {}", e)))?;
    globals.set(REQUEST_GLOBAL, request_json)
        .map_err(|e| WorkbenchError::Script(format!("Failed to set request global: {}", e)))?;
    globals.set(RESPONSE_GLOBAL, response_json)
        .map_err(|e| WorkbenchError::Script(format!("Failed to set response global: {}", e)))?;

    ctx.eval::<Value, _>(PRELUDE)
        .map_err(|e| WorkbenchError::Script(format!("Failed to install script bindings: {}", e)))?;

    Ok(())
}
