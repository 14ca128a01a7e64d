//! Embedded Python harness source.
//!
//! The harness simulates the decision platform's runtime: it builds a
//! namespace of sentinel defaults, merges the test input over it (with
//! special handling for `interval_time` and the `decisions` logger), executes
//! the compiled template, and prints one JSON result document to stdout.
//!
//! Protocol: the harness reads a single JSON document
//! `{"code": "<compiled template>", "input": {...}}` from stdin and prints
//! `{"success", "error", "action", "description", "decisions", "side_outputs"}`.
//! A template exception is a *successful* harness invocation (exit 0) with
//! `success: false` and the full traceback in `error`.

/// Complete harness program, materialized to disk once per process.
pub const HARNESS_SOURCE: &str = r#"
"""Rule harness: executes a compiled rule template in a simulated runtime."""

import json
import sys
import traceback
from datetime import datetime


class DecisionLogger:
    """Collects ordered decision entries logged by the template."""

    def __init__(self):
        self.reasons = []

    def reason(self, action, description, **kwargs):
        entry = {"action": action, "description": description}
        entry.update(kwargs)
        self.reasons.append(entry)
        return action

    def to_dict(self):
        return {"reasons": self.reasons}


def build_globals(input_data):
    """Build the global namespace a template expects."""

    now = datetime.now()
    it = input_data.get("interval_time")
    if isinstance(it, str):
        now = datetime.fromisoformat(it)
    elif isinstance(it, dict):
        now = now.replace(
            hour=it.get("hour", now.hour),
            minute=it.get("minute", now.minute),
            second=0,
            microsecond=0,
        )

    decisions = DecisionLogger()

    ns = {
        # Core inputs
        "interval_time": now,
        "battery_soc": 50.0,
        "buy_price": 20.0,
        "sell_price": 10.0,
        "solar_power": 0,
        "buy_forecast": [],
        "sell_forecast": [],
        "hourly_gti_forecast": [],
        "history_sell_prices": [],
        "runtime_params": {},
        # Outputs
        "action": "auto",
        "feed_in_power_limitation": None,
        "optimal_charging": 5000,
        "optimal_discharging": 5000,
        "import_soc": None,
        "always_export_rrp": None,
        "mqtt_topic_push_mining_1": "Off",
        "cheap_power_available": False,
        # Decision logger: never overridable from input
        "decisions": decisions,
    }

    for key, value in input_data.items():
        if key in ("interval_time", "decisions"):
            continue
        ns[key] = value

    # Legacy alias: first-seen-wins, never an override.
    if "soc" in input_data and "battery_soc" not in input_data:
        ns["battery_soc"] = input_data["soc"]

    return ns


def run_template(template_code, input_data):
    ns = build_globals(input_data)
    decisions = ns["decisions"]

    try:
        exec(compile(template_code, "<template>", "exec"), ns)
    except Exception:
        return {
            "success": False,
            "error": traceback.format_exc(),
            "action": None,
            "description": None,
            "decisions": {"reasons": []},
            "side_outputs": {},
        }

    last_reason = decisions.reasons[-1] if decisions.reasons else None

    return {
        "success": True,
        "error": None,
        "action": ns.get("action", "auto"),
        "description": last_reason["description"] if last_reason else None,
        "decisions": decisions.to_dict(),
        "side_outputs": {
            "feed_in_power_limitation": ns.get("feed_in_power_limitation"),
            "optimal_charging": ns.get("optimal_charging"),
            "cheap_power_available": ns.get("cheap_power_available", False),
        },
    }


def main():
    try:
        payload = json.load(sys.stdin)
        template_code = payload["code"]
        input_data = payload.get("input") or {}
    except (ValueError, KeyError) as exc:
        print(json.dumps({"success": False, "error": f"Bad harness payload: {exc}"}))
        sys.exit(1)

    result = run_template(template_code, input_data)
    print(json.dumps(result, default=str))


if __name__ == "__main__":
    main()
"#;
