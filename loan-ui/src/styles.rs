//! Component stylesheets, injected with a `style` element by each view.

pub const SHELL_STYLES: &str = r#"
:root {
    --surface: #ffffff;
    --surface-muted: #f5f7fb;
    --line: #dde3ee;
    --ink: #1f2937;
    --ink-soft: #4b5563;
    --ink-faint: #9ca3af;
    --brand: #0f766e;
    --brand-strong: #115e59;
    --warn: #d97706;
    --danger: #dc2626;
}

html, body, #main {
    margin: 0;
    height: 100%;
    font-family: "Inter", system-ui, sans-serif;
    background: var(--surface-muted);
    color: var(--ink);
}

.loan-shell {
    display: grid;
    grid-template-columns: minmax(22rem, 2fr) 3fr;
    gap: 1rem;
    height: 100%;
    padding: 1rem;
    box-sizing: border-box;
}

.loan-side {
    display: flex;
    flex-direction: column;
    gap: 1rem;
    min-height: 0;
    overflow-y: auto;
}

@media (max-width: 960px) {
    .loan-shell { grid-template-columns: 1fr; height: auto; }
    .chat-container { height: 70vh; }
}
"#;

pub const CHAT_STYLES: &str = r#"
.chat-container {
    display: flex;
    flex-direction: column;
    height: 100%;
    min-height: 0;
    background: var(--surface, #ffffff);
    border: 1px solid var(--line, #dde3ee);
    border-radius: 0.75rem;
    overflow: hidden;
}

.chat-header {
    display: flex;
    align-items: center;
    justify-content: space-between;
    padding: 0.75rem 1rem;
    border-bottom: 1px solid var(--line, #dde3ee);
    flex-shrink: 0;
}

.chat-title {
    display: flex;
    align-items: center;
    gap: 0.5rem;
    font-weight: 600;
}

.chat-icon { font-size: 1.25rem; }

.chat-status {
    display: flex;
    align-items: center;
    gap: 0.4rem;
    font-size: 0.75rem;
    color: var(--ink-soft, #4b5563);
}

.status-dot { color: var(--brand, #0f766e); font-size: 0.5rem; }
.status-dot--pending { color: var(--warn, #d97706); }
.status-dot--offline { color: var(--danger, #dc2626); }

.end-session-button {
    margin-left: 0.5rem;
    padding: 0.25rem 0.6rem;
    font-size: 0.75rem;
    background: transparent;
    color: var(--ink-soft, #4b5563);
    border: 1px solid var(--line, #dde3ee);
    border-radius: 999px;
    cursor: pointer;
}

.end-session-button:hover:not(:disabled) { border-color: var(--danger, #dc2626); color: var(--danger, #dc2626); }
.end-session-button:disabled { opacity: 0.5; cursor: not-allowed; }

.messages-scroll-area {
    flex: 1;
    overflow-y: auto;
    padding: 1rem;
    scroll-behavior: smooth;
}

.messages-list {
    display: flex;
    flex-direction: column;
    gap: 1rem;
}

.empty-state {
    display: flex;
    flex-direction: column;
    align-items: center;
    padding: 3rem 1rem;
    color: var(--ink-faint, #9ca3af);
    text-align: center;
}

.empty-icon { font-size: 3rem; margin-bottom: 1rem; opacity: 0.5; }
.empty-state p { font-weight: 500; color: var(--ink-soft, #4b5563); margin: 0 0 0.25rem 0; }
.empty-state span { font-size: 0.875rem; }

.message-row { display: flex; gap: 0.75rem; }
.user-row { flex-direction: row-reverse; }

.avatar {
    width: 2rem;
    height: 2rem;
    border-radius: 50%;
    display: flex;
    align-items: center;
    justify-content: center;
    font-size: 0.75rem;
    font-weight: 600;
    flex-shrink: 0;
}

.user-avatar { background: var(--brand, #0f766e); color: white; }
.assistant-avatar { background: var(--surface-muted, #f5f7fb); border: 1px solid var(--line, #dde3ee); }

.message-content {
    display: flex;
    flex-direction: column;
    gap: 0.25rem;
    max-width: calc(100% - 3rem);
}

.user-row .message-content { align-items: flex-end; }

.message-header { display: flex; gap: 0.5rem; font-size: 0.75rem; }
.user-row .message-header { flex-direction: row-reverse; }
.sender-name { font-weight: 500; color: var(--ink-soft, #4b5563); }
.message-time { color: var(--ink-faint, #9ca3af); }
.failed-badge { color: var(--danger, #dc2626); font-style: italic; }

.message-bubble {
    padding: 0.75rem 1rem;
    border-radius: 1rem;
    line-height: 1.5;
    white-space: pre-wrap;
    word-wrap: break-word;
}

.user-bubble {
    background: var(--brand, #0f766e);
    color: white;
    border-bottom-right-radius: 0.25rem;
}

.assistant-bubble {
    background: var(--surface-muted, #f5f7fb);
    border: 1px solid var(--line, #dde3ee);
    border-bottom-left-radius: 0.25rem;
}

.attachment-list { display: flex; flex-wrap: wrap; gap: 0.5rem; justify-content: flex-end; }

.attachment {
    display: inline-flex;
    align-items: center;
    gap: 0.35rem;
    font-size: 0.8rem;
    color: var(--ink-soft, #4b5563);
    text-decoration: none;
    border: 1px solid var(--line, #dde3ee);
    border-radius: 0.5rem;
    padding: 0.3rem 0.5rem;
}

.attachment--image { padding: 0; overflow: hidden; }
.attachment-thumb { display: block; max-width: 10rem; max-height: 7rem; object-fit: cover; }

.typing-indicator {
    display: flex;
    gap: 0.25rem;
    padding: 1rem;
    background: var(--surface-muted, #f5f7fb);
    border-radius: 1rem;
    width: fit-content;
}

.typing-indicator span {
    width: 0.5rem;
    height: 0.5rem;
    background: var(--ink-faint, #9ca3af);
    border-radius: 50%;
    animation: typing-bounce 1.4s infinite ease-in-out both;
}

.typing-indicator span:nth-child(1) { animation-delay: -0.32s; }
.typing-indicator span:nth-child(2) { animation-delay: -0.16s; }

@keyframes typing-bounce {
    0%, 80%, 100% { transform: scale(0); }
    40% { transform: scale(1); }
}

.chat-input-area {
    padding: 0.75rem 1rem;
    border-top: 1px solid var(--line, #dde3ee);
    flex-shrink: 0;
}

.input-wrapper { display: flex; gap: 0.5rem; align-items: flex-end; }

.chat-textarea {
    flex: 1;
    padding: 0.75rem 1rem;
    border: 1px solid var(--line, #dde3ee);
    border-radius: 1.5rem;
    font: inherit;
    resize: none;
    outline: none;
    min-height: 2.75rem;
    max-height: 8rem;
}

.chat-textarea:focus { border-color: var(--brand, #0f766e); }

.send-button {
    width: 2.75rem;
    height: 2.75rem;
    display: flex;
    align-items: center;
    justify-content: center;
    background: var(--brand, #0f766e);
    color: white;
    border: none;
    border-radius: 50%;
    cursor: pointer;
    font-size: 1.2rem;
    flex-shrink: 0;
}

.send-button:hover:not(:disabled) { background: var(--brand-strong, #115e59); }
.send-button:disabled { background: var(--line, #dde3ee); color: var(--ink-faint, #9ca3af); cursor: not-allowed; }
.send-button .spinner { animation: spin 1s linear infinite; }

@keyframes spin {
    from { transform: rotate(0deg); }
    to { transform: rotate(360deg); }
}

.input-hint {
    margin-top: 0.5rem;
    font-size: 0.75rem;
    color: var(--ink-faint, #9ca3af);
    text-align: center;
}
"#;

pub const FLOW_STYLES: &str = r#"
.flow-card {
    background: var(--surface, #ffffff);
    border: 1px solid var(--line, #dde3ee);
    border-radius: 0.75rem;
    padding: 0.75rem 1rem;
}

.flow-head { display: flex; align-items: baseline; justify-content: space-between; }
.flow-title { margin: 0; font-size: 1rem; }
.flow-hint { font-size: 0.75rem; color: var(--ink-faint, #9ca3af); }

.flow-canvas { width: 100%; height: auto; }

.flow-edge {
    stroke: #94a3b8;
    stroke-width: 2;
}

.flow-edge--animated {
    stroke: var(--brand, #0f766e);
    stroke-dasharray: 8 6;
    animation: flow-dash 0.8s linear infinite;
}

@keyframes flow-dash {
    to { stroke-dashoffset: -28; }
}

.flow-edge-label { font-size: 11px; fill: var(--ink-soft, #4b5563); }

.flow-node { cursor: pointer; }
.flow-node rect { fill: var(--surface, #ffffff); stroke-width: 2; }
.flow-node--processing rect { fill: #fef3c7; }
.flow-node--complete rect { fill: #ecfdf5; }
.flow-node-label { font-size: 13px; font-weight: 600; fill: var(--ink, #1f2937); pointer-events: none; }
.flow-node-badge { fill: var(--brand, #0f766e); }
.flow-node-badge-text { font-size: 10px; fill: white; pointer-events: none; }

.flow-modal-backdrop {
    position: fixed;
    inset: 0;
    background: rgba(15, 23, 42, 0.45);
    display: flex;
    align-items: center;
    justify-content: center;
    z-index: 50;
}

.flow-modal {
    width: min(36rem, 92vw);
    max-height: 80vh;
    overflow-y: auto;
    background: var(--surface, #ffffff);
    border-radius: 0.75rem;
    padding: 1rem 1.25rem;
    box-shadow: 0 20px 40px rgba(15, 23, 42, 0.25);
}

.flow-modal-head { display: flex; align-items: center; justify-content: space-between; }
.flow-modal-head h3 { margin: 0; }
.flow-modal-close { background: none; border: none; font-size: 1rem; cursor: pointer; color: var(--ink-soft, #4b5563); }
.flow-modal-description { color: var(--ink-soft, #4b5563); font-size: 0.875rem; }
.flow-modal-empty { color: var(--ink-faint, #9ca3af); font-style: italic; }

.flow-trace-list { display: flex; flex-direction: column; gap: 0.5rem; }
.flow-trace { border-left: 2px solid var(--line, #dde3ee); padding-left: 0.6rem; }
.flow-trace-time { font-size: 0.7rem; color: var(--ink-faint, #9ca3af); }
.flow-trace-text { margin: 0.2rem 0 0; white-space: pre-wrap; font-size: 0.8rem; font-family: ui-monospace, monospace; }
"#;

pub const LETTER_STYLES: &str = r#"
.letter-card {
    background: var(--surface, #ffffff);
    border: 1px solid var(--line, #dde3ee);
    border-radius: 0.75rem;
    padding: 0.75rem 1rem;
    display: flex;
    flex-direction: column;
    gap: 0.75rem;
}

.letter-title { margin: 0; font-size: 1rem; }

.letter-grid {
    display: grid;
    grid-template-columns: repeat(auto-fill, minmax(12rem, 1fr));
    gap: 0.5rem 0.75rem;
}

.letter-field { display: flex; flex-direction: column; gap: 0.2rem; font-size: 0.75rem; color: var(--ink-soft, #4b5563); }
.letter-field input { padding: 0.4rem 0.5rem; border: 1px solid var(--line, #dde3ee); border-radius: 0.4rem; font: inherit; font-size: 0.875rem; }

.letter-checks { display: flex; flex-wrap: wrap; gap: 0.5rem 1rem; font-size: 0.8rem; }
.letter-check { display: inline-flex; align-items: center; gap: 0.3rem; }

.letter-submit {
    align-self: flex-start;
    padding: 0.45rem 0.9rem;
    background: var(--brand, #0f766e);
    color: white;
    border: none;
    border-radius: 0.4rem;
    cursor: pointer;
}

.letter-submit:disabled { opacity: 0.6; cursor: wait; }
.letter-error { color: var(--danger, #dc2626); font-size: 0.8rem; margin: 0; }
.letter-preview { width: 100%; min-height: 28rem; border: 1px solid var(--line, #dde3ee); border-radius: 0.4rem; background: white; }
"#;
